//! JVM 옵션 체크리스트
//!
//! 명령줄 옵션 문자열만 보고 판단합니다. 같은 옵션이 여러 번 나오면
//! JVM과 같이 마지막 값이 이깁니다.

use heapscope_core::units::Memory;

use crate::analysis::AnalysisKey;

/// 이보다 큰 스레드 스택은 경고 대상
const LARGE_THREAD_STACK: Memory = Memory::megabytes(1);

/// 공백으로 나눈 JVM 옵션 목록
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmOptions {
    options: Vec<String>,
}

impl JvmOptions {
    pub fn parse(text: &str) -> Self {
        Self {
            options: text.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// 접두사로 시작하는 마지막 옵션의 나머지 부분
    fn value(&self, prefix: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find_map(|option| option.strip_prefix(prefix))
    }

    /// 접두사 후보 중 하나로 지정된 크기 (바이트 단위 기본값)
    fn size(&self, prefixes: &[&str]) -> Option<Memory> {
        prefixes
            .iter()
            .find_map(|prefix| self.value(prefix).and_then(parse_size))
    }

    /// 최소 힙 (`-Xms`, `-XX:InitialHeapSize=`)
    pub fn min_heap(&self) -> Option<Memory> {
        self.size(&["-Xms", "-XX:InitialHeapSize="])
    }

    /// 최대 힙 (`-Xmx`, `-XX:MaxHeapSize=`)
    pub fn max_heap(&self) -> Option<Memory> {
        self.size(&["-Xmx", "-XX:MaxHeapSize="])
    }

    /// 최소 perm/metaspace
    pub fn min_perm(&self) -> Option<Memory> {
        self.size(&["-XX:PermSize=", "-XX:MetaspaceSize="])
    }

    /// 최대 perm/metaspace
    pub fn max_perm(&self) -> Option<Memory> {
        self.size(&["-XX:MaxPermSize=", "-XX:MaxMetaspaceSize="])
    }

    /// 스레드 스택 크기. `-XX:ThreadStackSize=`의 단위 없는 값은 KB입니다.
    pub fn thread_stack_size(&self) -> Option<Memory> {
        self.value("-Xss").and_then(parse_size).or_else(|| {
            self.value("-XX:ThreadStackSize=").and_then(|value| {
                match value.parse::<i64>() {
                    Ok(kilobytes) => Some(Memory::kilobytes(kilobytes)),
                    Err(_) => parse_size(value),
                }
            })
        })
    }
}

/// JVM 크기 표기 (`512m`, `1G`, `1073741824`)
fn parse_size(text: &str) -> Option<Memory> {
    if text.ends_with(|c: char| c.is_ascii_digit()) {
        return text.parse::<i64>().ok().map(Memory::bytes);
    }
    Memory::parse(text).ok()
}

/// 옵션 체크리스트를 적용합니다. 옵션이 없으면 아무것도 보고하지 않습니다.
pub fn check_options(options: &JvmOptions) -> Vec<AnalysisKey> {
    if options.is_empty() {
        return Vec::new();
    }

    let mut keys = Vec::new();
    if differs(options.min_heap(), options.max_heap()) {
        keys.push(AnalysisKey::HeapMinNotEqualMax);
    }
    if differs(options.min_perm(), options.max_perm()) {
        keys.push(AnalysisKey::PermMinNotEqualMax);
    }
    match options.thread_stack_size() {
        None => keys.push(AnalysisKey::ThreadStackSizeNotSet),
        Some(size) if size > LARGE_THREAD_STACK => keys.push(AnalysisKey::ThreadStackSizeLarge),
        Some(_) => {}
    }
    keys
}

/// 두 값이 모두 지정되었고 서로 다른지 여부
fn differs(min: Option<Memory>, max: Option<Memory>) -> bool {
    matches!((min, max), (Some(min), Some(max)) if min != max)
}
