use std::fmt;

use ahash::AHashMap;

use super::error::UciError;

/// Value held by an option. The variant always matches the option's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Trigger,
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl OptionValue {
    /// Name of the UCI type this value belongs to.
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Trigger => "button",
            OptionValue::Integer(_) => "spin",
            OptionValue::Text(_) => "string",
            OptionValue::Boolean(_) => "check",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Trigger => Ok(()),
            OptionValue::Integer(value) => write!(f, "{}", value),
            OptionValue::Text(value) if value.is_empty() => write!(f, "{}", EMPTY_STRING),
            OptionValue::Text(value) => write!(f, "{}", value),
            OptionValue::Boolean(value) => write!(f, "{}", value),
        }
    }
}

/// Token used on the wire for an empty string value.
pub const EMPTY_STRING: &str = "<empty>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOptionType {
    Button,
    Spin { min: i64, max: i64 },
    String,
    Check,
}

impl UciOptionType {
    pub fn name(&self) -> &'static str {
        match self {
            UciOptionType::Button => "button",
            UciOptionType::Spin { .. } => "spin",
            UciOptionType::String => "string",
            UciOptionType::Check => "check",
        }
    }

    /// Parses the raw `setoption` value text for this type.
    pub fn parse_value(&self, raw: &str) -> Result<OptionValue, UciError> {
        match self {
            UciOptionType::Button => Ok(OptionValue::Trigger),
            UciOptionType::Spin { .. } => raw
                .trim()
                .parse::<i64>()
                .map(OptionValue::Integer)
                .map_err(|_| UciError::Parse {
                    expected: "an integer number",
                    found: raw.trim().to_string(),
                }),
            UciOptionType::String if raw == EMPTY_STRING => Ok(OptionValue::Text(String::new())),
            UciOptionType::String => Ok(OptionValue::Text(raw.to_string())),
            UciOptionType::Check => Ok(OptionValue::Boolean(raw.trim() == "true")),
        }
    }

    fn validate(&self, name: &str, value: &OptionValue) -> Result<(), UciError> {
        if self.name() != value.type_name() {
            return Err(UciError::TypeMismatch {
                name: name.to_string(),
                expected: self.name(),
                found: value.type_name(),
            });
        }

        if let (UciOptionType::Spin { min, max }, OptionValue::Integer(value)) = (self, value) {
            if value > max {
                return Err(UciError::AboveMaximum {
                    name: name.to_string(),
                    max: *max,
                });
            }
            if value < min {
                return Err(UciError::BelowMinimum {
                    name: name.to_string(),
                    min: *min,
                });
            }
        }
        Ok(())
    }
}

/// Snapshot of a registered option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInfo {
    pub name: String,
    pub option_type: UciOptionType,
    pub current: OptionValue,
    pub default: OptionValue,
}

impl OptionInfo {
    /// Formats the `option name ... type ...` line advertised on `uci`.
    pub fn to_uci(&self) -> String {
        match self.option_type {
            UciOptionType::Button => format!("option name {} type button", self.name),
            UciOptionType::Spin { min, max } => format!(
                "option name {} type spin default {} min {} max {}",
                self.name, self.default, min, max
            ),
            UciOptionType::String | UciOptionType::Check => format!(
                "option name {} type {} default {}",
                self.name,
                self.option_type.name(),
                self.default
            ),
        }
    }
}

type ChangeHandler = Box<dyn FnMut(&OptionValue)>;

struct UciOption {
    name: String,
    option_type: UciOptionType,
    current: OptionValue,
    default: OptionValue,
    on_change: ChangeHandler,
}

impl UciOption {
    fn info(&self) -> OptionInfo {
        OptionInfo {
            name: self.name.clone(),
            option_type: self.option_type,
            current: self.current.clone(),
            default: self.default.clone(),
        }
    }
}

/// Named, typed engine settings.
///
/// Values are validated once, in [`OptionRegistry::set`], and the option's
/// change handler runs synchronously before `set` returns. Options are listed
/// in registration order; re-registering a name replaces the option in place.
#[derive(Default)]
pub struct OptionRegistry {
    options: Vec<UciOption>,
    index: AHashMap<String, usize>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_trigger<F>(&mut self, name: &str, mut on_trigger: F)
    where
        F: FnMut() + 'static,
    {
        self.insert(
            name,
            UciOptionType::Button,
            OptionValue::Trigger,
            Box::new(move |_| on_trigger()),
        );
    }

    pub fn register_boolean<F>(&mut self, name: &str, default: bool, mut on_change: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.insert(
            name,
            UciOptionType::Check,
            OptionValue::Boolean(default),
            Box::new(move |value| {
                if let OptionValue::Boolean(value) = value {
                    on_change(*value);
                }
            }),
        );
    }

    pub fn register_integer<F>(&mut self, name: &str, default: i64, min: i64, max: i64, mut on_change: F)
    where
        F: FnMut(i64) + 'static,
    {
        self.insert(
            name,
            UciOptionType::Spin { min, max },
            OptionValue::Integer(default),
            Box::new(move |value| {
                if let OptionValue::Integer(value) = value {
                    on_change(*value);
                }
            }),
        );
    }

    pub fn register_text<F>(&mut self, name: &str, default: &str, mut on_change: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.insert(
            name,
            UciOptionType::String,
            OptionValue::Text(default.to_string()),
            Box::new(move |value| {
                if let OptionValue::Text(value) = value {
                    on_change(value);
                }
            }),
        );
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool, UciError> {
        match self.lookup(name)?.current {
            OptionValue::Boolean(value) => Ok(value),
            ref other => Err(mismatch(name, "check", other)),
        }
    }

    pub fn get_integer(&self, name: &str) -> Result<i64, UciError> {
        match self.lookup(name)?.current {
            OptionValue::Integer(value) => Ok(value),
            ref other => Err(mismatch(name, "spin", other)),
        }
    }

    pub fn get_text(&self, name: &str) -> Result<&str, UciError> {
        match &self.lookup(name)?.current {
            OptionValue::Text(value) => Ok(value.as_str()),
            other => Err(mismatch(name, "string", other)),
        }
    }

    /// Validates and stores `value`, then fires the option's change handler.
    /// Nothing is stored and no handler runs when validation fails.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), UciError> {
        let option = self.lookup_mut(name)?;
        option.option_type.validate(name, &value)?;

        option.current = value;
        (option.on_change)(&option.current);
        Ok(())
    }

    /// Shorthand for setting a button option.
    pub fn trigger(&mut self, name: &str) -> Result<(), UciError> {
        self.set(name, OptionValue::Trigger)
    }

    pub fn describe(&self, name: &str) -> Result<OptionInfo, UciError> {
        self.lookup(name).map(UciOption::info)
    }

    pub fn list_all(&self) -> Vec<OptionInfo> {
        self.options.iter().map(UciOption::info).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn insert(
        &mut self,
        name: &str,
        option_type: UciOptionType,
        default: OptionValue,
        on_change: ChangeHandler,
    ) {
        let option = UciOption {
            name: name.to_string(),
            option_type,
            current: default.clone(),
            default,
            on_change,
        };

        match self.index.get(name) {
            Some(&slot) => self.options[slot] = option,
            None => {
                self.index.insert(name.to_string(), self.options.len());
                self.options.push(option);
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<&UciOption, UciError> {
        self.index
            .get(name)
            .map(|&slot| &self.options[slot])
            .ok_or_else(|| UciError::OptionNotFound(name.to_string()))
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut UciOption, UciError> {
        match self.index.get(name) {
            Some(&slot) => Ok(&mut self.options[slot]),
            None => Err(UciError::OptionNotFound(name.to_string())),
        }
    }
}

fn mismatch(name: &str, expected: &'static str, found: &OptionValue) -> UciError {
    UciError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.type_name(),
    }
}
