//! 얽힌 줄 버퍼
//!
//! JVM은 여러 스레드가 같은 로그에 동시에 쓰기 때문에 한 이벤트가 여러 줄로
//! 쪼개지거나 다른 이벤트 메시지가 중간에 끼어듭니다. [`LineBuffer`]는
//! 열린 논리 줄 하나와, 열린 줄이 닫힐 때까지 미뤄둔 완성된 줄들을 보관합니다.
//!
//! 열린 줄은 버려지지 않습니다. 닫히지 않은 채로 다른 줄이 오거나 입력이
//! 끝나면 그대로 출력됩니다 (잘린 이벤트 보존).

use std::mem;

/// 열린 논리 줄과 미뤄둔 줄, 완성된 출력 줄 버퍼
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Option<String>,
    deferred: Vec<String>,
    output: Vec<String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 열린 논리 줄이 있는지 여부
    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// 열린 줄에 텍스트를 덧붙입니다. 열린 줄이 없으면 새로 엽니다.
    pub fn append(&mut self, text: &str) {
        self.pending.get_or_insert_with(String::new).push_str(text);
    }

    /// 텍스트를 덧붙이고 열린 줄을 닫습니다. 미뤄둔 줄은 닫힌 줄 뒤에 나옵니다.
    pub fn terminate(&mut self, text: &str) {
        self.append(text);
        self.flush();
    }

    /// 열린 줄이 닫힐 때까지 완성된 줄을 미룹니다.
    pub fn defer(&mut self, line: String) {
        self.deferred.push(line);
    }

    /// 열린 줄을 먼저 내보낸 뒤 완성된 줄을 출력합니다.
    pub fn emit(&mut self, line: String) {
        self.flush();
        self.output.push(line);
    }

    /// 열린 줄과 미뤄둔 줄을 출력으로 옮깁니다.
    pub fn flush(&mut self) {
        if let Some(line) = self.pending.take() {
            self.output.push(line);
        }
        self.output.append(&mut self.deferred);
    }

    /// 지금까지 완성된 줄 수
    pub fn completed(&self) -> usize {
        self.output.len()
    }

    /// 완성된 줄을 꺼냅니다. 열린 줄과 미뤄둔 줄은 남습니다.
    pub fn take_completed(&mut self) -> Vec<String> {
        mem::take(&mut self.output)
    }

    /// 남은 줄을 모두 내보내고 출력 전체를 돌려줍니다.
    pub fn finish(mut self) -> Vec<String> {
        self.flush();
        self.output
    }
}
