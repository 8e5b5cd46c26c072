//! 단위 변환 -- 메모리 크기와 시간 값
//!
//! 두 가지 반올림 규칙이 공존하며 서로 다르게 유지되어야 합니다.
//!
//! - 로그 문자열을 처음 읽을 때의 시간 변환 (`"0.0225213"` 초 -> 22ms)은
//!   **0 방향 절삭**입니다. 인접 이벤트 사이에 음수/0 간격이 생기지 않습니다.
//! - 이미 정수로 저장된 값의 단위를 바꿀 때 (ns -> ms, B -> KB)는
//!   **round-half-to-even**입니다.
//!
//! 모든 변환은 10진 문자열과 정수 연산으로만 수행하며 부동소수점을 쓰지 않습니다.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// 메모리 단위
///
/// 선언 순서가 곧 정밀도 순서입니다 (`Bytes`가 가장 세밀).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    /// 이 단위 1개의 바이트 수
    pub const fn bytes(self) -> i64 {
        match self {
            Self::Bytes => 1,
            Self::Kilobytes => 1024,
            Self::Megabytes => 1024 * 1024,
            Self::Gigabytes => 1024 * 1024 * 1024,
        }
    }

    /// 로그 접미사 문자 (`B`, `K`, `M`, `G`, 대소문자 무시)에서 단위를 얻습니다.
    pub fn from_suffix(suffix: char) -> Option<Self> {
        match suffix.to_ascii_uppercase() {
            'B' => Some(Self::Bytes),
            'K' => Some(Self::Kilobytes),
            'M' => Some(Self::Megabytes),
            'G' => Some(Self::Gigabytes),
            _ => None,
        }
    }

    /// 로그 표기 접미사
    pub const fn suffix(self) -> char {
        match self {
            Self::Bytes => 'B',
            Self::Kilobytes => 'K',
            Self::Megabytes => 'M',
            Self::Gigabytes => 'G',
        }
    }

    /// 한 단계 더 세밀한 단위
    const fn finer(self) -> Option<Self> {
        match self {
            Self::Bytes => None,
            Self::Kilobytes => Some(Self::Bytes),
            Self::Megabytes => Some(Self::Kilobytes),
            Self::Gigabytes => Some(Self::Megabytes),
        }
    }
}

/// 단위를 명시적으로 가진 메모리 양
///
/// 값은 항상 해당 단위의 정수 개수입니다. 로그가 `K`로 기록한 값은
/// 그대로 `K`로 보관하며, 경계에서 명시적으로 변환하기 전에는 다른 단위로
/// 바뀌지 않습니다.
///
/// 동등성/순서 비교는 정확한 바이트 양 기준입니다 (`1M == 1024K`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Memory {
    value: i64,
    unit: MemoryUnit,
}

impl Memory {
    /// 0 KB
    pub const ZERO: Memory = Memory::kilobytes(0);

    pub const fn new(value: i64, unit: MemoryUnit) -> Self {
        Self { value, unit }
    }

    pub const fn bytes(value: i64) -> Self {
        Self::new(value, MemoryUnit::Bytes)
    }

    pub const fn kilobytes(value: i64) -> Self {
        Self::new(value, MemoryUnit::Kilobytes)
    }

    pub const fn megabytes(value: i64) -> Self {
        Self::new(value, MemoryUnit::Megabytes)
    }

    pub const fn gigabytes(value: i64) -> Self {
        Self::new(value, MemoryUnit::Gigabytes)
    }

    pub const fn value(&self) -> i64 {
        self.value
    }

    pub const fn unit(&self) -> MemoryUnit {
        self.unit
    }

    /// 정확한 바이트 양
    pub fn as_bytes(&self) -> i128 {
        i128::from(self.value) * i128::from(self.unit.bytes())
    }

    /// 다른 단위로 변환합니다.
    ///
    /// 더 세밀한 단위로의 변환은 정확하고, 더 거친 단위로의 변환은
    /// round-half-to-even을 적용합니다.
    pub fn convert_to(self, unit: MemoryUnit) -> Memory {
        if unit == self.unit {
            return self;
        }
        let value = if unit < self.unit {
            let factor = i128::from(self.unit.bytes() / unit.bytes());
            i128::from(self.value) * factor
        } else {
            let factor = i128::from(unit.bytes() / self.unit.bytes());
            round_half_even(i128::from(self.value), factor)
        };
        Memory::new(clamp_i64(value), unit)
    }

    /// KB 값 (round-half-to-even)
    pub fn to_kilobytes(self) -> i64 {
        self.convert_to(MemoryUnit::Kilobytes).value
    }

    /// 두 값 중 더 세밀한 단위로 맞춘 뒤 뺍니다 (정확한 연산).
    pub fn minus(self, other: Memory) -> Memory {
        let unit = self.unit.min(other.unit);
        let lhs = self.convert_to(unit).value;
        let rhs = other.convert_to(unit).value;
        Memory::new(lhs.saturating_sub(rhs), unit)
    }

    /// 두 값 중 더 세밀한 단위로 맞춘 뒤 더합니다 (정확한 연산).
    pub fn plus(self, other: Memory) -> Memory {
        let unit = self.unit.min(other.unit);
        let lhs = self.convert_to(unit).value;
        let rhs = other.convert_to(unit).value;
        Memory::new(lhs.saturating_add(rhs), unit)
    }

    /// 숫자 부분과 단위로 메모리 값을 만듭니다.
    ///
    /// 소수부가 0이 아닌 값 (G1 상세 로그의 `3083.2K` 등)은 한 단계 세밀한
    /// 단위로 옮겨 round-half-to-even으로 정수화합니다.
    pub fn from_parts(number: &str, unit: MemoryUnit) -> Result<Memory, ParseError> {
        let (integer, fraction) = split_decimal(number)?;
        let whole = parse_digits(integer, number)?;

        if fraction.bytes().all(|b| b == b'0') {
            return Ok(Memory::new(clamp_i64(whole), unit));
        }

        let scale = pow10(fraction.len(), number)?;
        let numerator = whole * scale + parse_digits(fraction, number)?;
        let target = unit.finer().unwrap_or(unit);
        let factor = i128::from(unit.bytes() / target.bytes());
        let value = round_half_even(numerator * factor, scale);
        Ok(Memory::new(clamp_i64(value), target))
    }

    /// 로그 표기 (`17472K`, `14.0M`, `16817 K`)를 파싱합니다.
    pub fn parse(text: &str) -> Result<Memory, ParseError> {
        let text = text.trim();
        let suffix = text
            .chars()
            .last()
            .ok_or_else(|| ParseError::InvalidMemory(text.to_owned()))?;
        let unit = MemoryUnit::from_suffix(suffix)
            .ok_or_else(|| ParseError::InvalidMemory(text.to_owned()))?;
        let number = text[..text.len() - suffix.len_utf8()].trim_end();
        Self::from_parts(number, unit).map_err(|_| ParseError::InvalidMemory(text.to_owned()))
    }
}

impl PartialEq for Memory {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Memory {}

impl PartialOrd for Memory {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Memory {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(&other.as_bytes())
    }
}

impl Hash for Memory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

// --- 시간 변환 ---

/// `"초.소수"` 문자열을 밀리초로 변환합니다 (0 방향 절삭).
///
/// `,`도 소수점으로 인정합니다 (일부 로케일의 JVM 출력).
///
/// ```
/// use heapscope_core::units::secs_to_millis;
/// assert_eq!(secs_to_millis("0.0225213").unwrap(), 22);
/// ```
pub fn secs_to_millis(text: &str) -> Result<u64, ParseError> {
    decimal_scaled(text, 3)
}

/// `"초.소수"` 문자열을 마이크로초로 변환합니다 (0 방향 절삭).
pub fn secs_to_micros(text: &str) -> Result<u64, ParseError> {
    decimal_scaled(text, 6)
}

/// unified 로그의 `"2.908"` (ms) 문자열을 정수 밀리초로 변환합니다 (0 방향 절삭).
pub fn truncate_millis(text: &str) -> Result<u64, ParseError> {
    decimal_scaled(text, 0)
}

/// 나노초 -> 밀리초 (round-half-to-even)
pub fn nanos_to_millis(nanos: u64) -> u64 {
    clamp_u64(round_half_even(i128::from(nanos), 1_000_000))
}

/// 나노초 -> 마이크로초 (round-half-to-even)
pub fn nanos_to_micros(nanos: u64) -> u64 {
    clamp_u64(round_half_even(i128::from(nanos), 1_000))
}

/// 마이크로초 -> 밀리초 (round-half-to-even)
pub fn micros_to_millis(micros: u64) -> u64 {
    clamp_u64(round_half_even(i128::from(micros), 1_000))
}

/// 밀리초를 로그 타임스탬프 표기 (`"1.000"`)로 변환합니다.
pub fn format_secs(millis: u64) -> String {
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

/// `numerator / denominator`를 round-half-to-even으로 나눕니다.
///
/// `denominator`는 양수여야 합니다.
pub fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient & 1),
    }
}

/// 10진 문자열을 `10^scale` 배한 정수로 바꿉니다. 남는 자릿수는 버립니다.
fn decimal_scaled(text: &str, scale: usize) -> Result<u64, ParseError> {
    let (integer, fraction) = split_decimal(text.trim())?;
    let whole = parse_digits(integer, text)?;
    // 버리는 자릿수도 숫자여야 함 (바이트 슬라이스 전에 검사)
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::number(text, "expected decimal digits"));
    }

    let kept = &fraction[..fraction.len().min(scale)];
    let mut scaled_fraction = parse_digits(kept, text)?;
    for _ in kept.len()..scale {
        scaled_fraction *= 10;
    }

    let value = whole * pow10(scale, text)? + scaled_fraction;
    u64::try_from(value).map_err(|_| ParseError::number(text, "value out of range"))
}

/// 정수부와 소수부로 나눕니다. 부호는 허용하지 않습니다.
fn split_decimal(text: &str) -> Result<(&str, &str), ParseError> {
    let mut parts = text.splitn(2, ['.', ',']);
    let integer = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    if integer.is_empty() {
        return Err(ParseError::number(text, "missing integer part"));
    }
    if fraction.contains(['.', ',']) {
        return Err(ParseError::number(text, "more than one decimal separator"));
    }
    Ok((integer, fraction))
}

fn parse_digits(digits: &str, original: &str) -> Result<i128, ParseError> {
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 30 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::number(original, "expected decimal digits"));
    }
    digits
        .parse::<i128>()
        .map_err(|e| ParseError::number(original, e.to_string()))
}

fn pow10(exponent: usize, original: &str) -> Result<i128, ParseError> {
    u32::try_from(exponent)
        .ok()
        .and_then(|e| 10_i128.checked_pow(e))
        .ok_or_else(|| ParseError::number(original, "too many fraction digits"))
}

fn clamp_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

fn clamp_u64(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(if value < 0 { 0 } else { u64::MAX })
}
