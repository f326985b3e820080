//! Type-erased printf-style argument storage and rendering.
//!
//! The C++ source stores arguments in `fmt::dynamic_format_arg_store`, a
//! type-erased vector populated by a fold expression over a variadic
//! template pack. Rust has no variadic templates; [`ArgValue`] plus
//! [`ArgStore`] plays the same role, and [`render`] plays the role of
//! `fmt::vprintf` against the stored template.

use smallvec::SmallVec;

use crate::error::FormatError;

/// A single type-erased logging argument.
#[derive(Debug, Clone)]
pub enum ArgValue {
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Char(char),
    Bool(bool),
}

impl From<i32> for ArgValue {
    fn from(v: i32) -> Self {
        ArgValue::I64(v as i64)
    }
}
impl From<i64> for ArgValue {
    fn from(v: i64) -> Self {
        ArgValue::I64(v)
    }
}
impl From<u32> for ArgValue {
    fn from(v: u32) -> Self {
        ArgValue::U64(v as u64)
    }
}
impl From<u64> for ArgValue {
    fn from(v: u64) -> Self {
        ArgValue::U64(v)
    }
}
impl From<usize> for ArgValue {
    fn from(v: usize) -> Self {
        ArgValue::U64(v as u64)
    }
}
impl From<f32> for ArgValue {
    fn from(v: f32) -> Self {
        ArgValue::F64(v as f64)
    }
}
impl From<f64> for ArgValue {
    fn from(v: f64) -> Self {
        ArgValue::F64(v)
    }
}
impl From<&str> for ArgValue {
    fn from(v: &str) -> Self {
        ArgValue::Str(v.to_string())
    }
}
impl From<String> for ArgValue {
    fn from(v: String) -> Self {
        ArgValue::Str(v)
    }
}
impl From<char> for ArgValue {
    fn from(v: char) -> Self {
        ArgValue::Char(v)
    }
}
impl From<bool> for ArgValue {
    fn from(v: bool) -> Self {
        ArgValue::Bool(v)
    }
}

/// A rented, reusable argument container.
///
/// Reserved for 10 positional entries inline, matching the pool sizing hint
/// in the original `dyn_arg_store_pool` (`reserve(10, 2)` — the "2 named"
/// half of that reservation has no counterpart here; see `SPEC_FULL.md`).
#[derive(Debug, Default)]
pub struct ArgStore {
    values: SmallVec<[ArgValue; 10]>,
}

impl ArgStore {
    pub fn new() -> Self {
        ArgStore { values: SmallVec::new() }
    }

    /// Appends an argument to the store.
    pub fn push(&mut self, value: impl Into<ArgValue>) {
        self.values.push(value.into());
    }

    /// Empties the store without shrinking its backing allocation, so the
    /// pool can recycle it without reallocating.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }
}

fn write_value(out: &mut String, value: &ArgValue, conv: char, width: Option<usize>, precision: Option<usize>) -> bool {
    let rendered = match (conv, value) {
        ('d' | 'i', ArgValue::I64(v)) => format!("{v}"),
        ('d' | 'i', ArgValue::U64(v)) => format!("{v}"),
        ('u', ArgValue::U64(v)) => format!("{v}"),
        ('u', ArgValue::I64(v)) => format!("{v}"),
        ('x', ArgValue::I64(v)) => format!("{:x}", v),
        ('x', ArgValue::U64(v)) => format!("{:x}", v),
        ('X', ArgValue::I64(v)) => format!("{:X}", v),
        ('X', ArgValue::U64(v)) => format!("{:X}", v),
        ('o', ArgValue::I64(v)) => format!("{:o}", v),
        ('o', ArgValue::U64(v)) => format!("{:o}", v),
        ('f' | 'F', ArgValue::F64(v)) => match precision {
            Some(p) => format!("{:.*}", p, v),
            None => format!("{:.6}", v),
        },
        ('f' | 'F', ArgValue::I64(v)) => format!("{:.6}", *v as f64),
        ('s', ArgValue::Str(v)) => v.clone(),
        ('s', ArgValue::Bool(v)) => v.to_string(),
        ('c', ArgValue::Char(v)) => v.to_string(),
        ('c', ArgValue::I64(v)) => char::from_u32(*v as u32).map(|c| c.to_string()).unwrap_or_default(),
        _ => return false,
    };

    match width {
        Some(w) if rendered.len() < w => {
            out.push_str(&" ".repeat(w - rendered.len()));
            out.push_str(&rendered);
        }
        _ => out.push_str(&rendered),
    }
    true
}

/// Renders `template` against `store`, appending the result to `out`.
///
/// Supports the `%d %i %u %x %X %o %f %.Nf %s %c %%` conversions with an
/// optional minimum field width, the subset exercised by printf-style
/// producer call sites in this crate's consumers. On any conversion this
/// function cannot satisfy (unknown specifier, argument kind mismatch, or
/// more conversions than stored arguments), it returns a [`FormatError`];
/// the caller (the backend worker, see `crate::backend`) appends the
/// `" -> ... Invalid format string"` fallback suffix defined in spec.md §7
/// and continues.
pub fn render(template: &str, store: &ArgStore, out: &mut String) -> Result<(), FormatError> {
    let mut chars = template.chars().peekable();
    let mut arg_index = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let mut width = String::new();
        while matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
            width.push(chars.next().unwrap());
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut prec = String::new();
            while matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
                prec.push(chars.next().unwrap());
            }
            precision = prec.parse::<usize>().ok();
        }

        // Skip length modifiers (l, ll, h, hh) — they don't change the
        // conversion in our type-erased model.
        while matches!(chars.peek(), Some('l') | Some('h')) {
            chars.next();
        }

        let conv = match chars.next() {
            Some(c) => c,
            None => return Err(FormatError::InvalidTemplate(template.to_string())),
        };

        let value = store
            .get(arg_index)
            .ok_or_else(|| FormatError::InvalidTemplate(template.to_string()))?;
        arg_index += 1;

        let width = width.parse::<usize>().ok();
        if !write_value(out, value, conv, width, precision) {
            return Err(FormatError::InvalidTemplate(template.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(values: &[ArgValue]) -> ArgStore {
        let mut s = ArgStore::new();
        for v in values {
            s.values.push(v.clone());
        }
        s
    }

    #[test]
    fn renders_simple_int() {
        let store = store_of(&[ArgValue::I64(88)]);
        let mut out = String::new();
        render("Text %d", &store, &mut out).unwrap();
        assert_eq!(out, "Text 88");
    }

    #[test]
    fn renders_string_and_literal_percent() {
        let store = store_of(&[ArgValue::Str("hi".into())]);
        let mut out = String::new();
        render("100%% %s", &store, &mut out).unwrap();
        assert_eq!(out, "100% hi");
    }

    #[test]
    fn renders_float_precision() {
        let store = store_of(&[ArgValue::F64(3.14159)]);
        let mut out = String::new();
        render("pi=%.2f", &store, &mut out).unwrap();
        assert_eq!(out, "pi=3.14");
    }

    #[test]
    fn renders_hex() {
        let store = store_of(&[ArgValue::U64(255)]);
        let mut out = String::new();
        render("0x%x", &store, &mut out).unwrap();
        assert_eq!(out, "0xff");
    }

    #[test]
    fn missing_argument_is_invalid_template() {
        let store = ArgStore::new();
        let mut out = String::new();
        assert!(render("%d", &store, &mut out).is_err());
    }

    #[test]
    fn unknown_conversion_is_invalid_template() {
        let store = store_of(&[ArgValue::I64(1)]);
        let mut out = String::new();
        assert!(render("%q", &store, &mut out).is_err());
    }
}
