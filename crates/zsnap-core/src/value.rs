//! Typed setting values
//!
//! Settings are persisted as plain strings. `SettingValue` converts between
//! that stored form and the primitive types the application reads.
//!
//! Parsing never panics: a value that cannot be interpreted as the target
//! type yields `None`, and callers fall back to a default.

/// A type that can be stored in and read back from a settings namespace
pub trait SettingValue: Sized {
    /// Parse the stored string form, returning `None` if it is malformed
    fn parse_setting(raw: &str) -> Option<Self>;

    /// Render the value in its stored string form
    fn to_setting(&self) -> String;
}

impl SettingValue for bool {
    /// Accepts `true`/`false` in any letter case, ignoring surrounding whitespace.
    fn parse_setting(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn to_setting(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

impl SettingValue for String {
    fn parse_setting(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_setting(&self) -> String {
        self.clone()
    }
}

macro_rules! impl_setting_value_fromstr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SettingValue for $ty {
                fn parse_setting(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }

                fn to_setting(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_setting_value_fromstr!(i32, i64, u32, u64, usize, f64);
