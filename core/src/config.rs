use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use uci::OptionRegistry;

macro_rules! define_config {
    ($(($field:ident, $uci_name:expr, $default:expr, $min:expr, $max:expr)),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EngineConfig {
            $(pub $field: i64,)*
        }

        impl Default for EngineConfig {
            fn default() -> Self {
                Self {
                    $($field: $default,)*
                }
            }
        }

        impl EngineConfig {
            /// Registers one spin option per field. Each change handler writes
            /// the new value back into `config`.
            pub fn register_options(config: &Rc<RefCell<Self>>, options: &mut OptionRegistry) {
                $(
                    let shared = Rc::clone(config);
                    options.register_integer($uci_name, $default, $min, $max, move |value| {
                        debug!("Set option '{}' to '{}'", $uci_name, value);
                        shared.borrow_mut().$field = value;
                    });
                )*
            }
        }
    };
}

define_config!(
    // Some tools (OpenBench) require Threads and Hash even though the search ignores them
    (threads, "Threads", 1, 1, 1),
    (hash_size, "Hash", 32, 1, 1024 * 1024),

    // Milliseconds held back from every time budget for communication lag
    (move_overhead, "Move Overhead", 50, 0, 5000),
);

#[cfg(test)]
mod tests {
    use super::*;
    use uci::OptionValue;

    #[test]
    fn test_options_write_back_into_config() {
        let config = Rc::new(RefCell::new(EngineConfig::default()));
        let mut options = OptionRegistry::new();
        EngineConfig::register_options(&config, &mut options);

        options.set("Hash", OptionValue::Integer(256)).unwrap();
        options.set("Move Overhead", OptionValue::Integer(0)).unwrap();
        assert!(options.set("Threads", OptionValue::Integer(2)).is_err());

        assert_eq!(
            *config.borrow(),
            EngineConfig {
                threads: 1,
                hash_size: 256,
                move_overhead: 0,
            }
        );
    }

    #[test]
    fn test_options_are_advertised_in_order() {
        let config = Rc::new(RefCell::new(EngineConfig::default()));
        let mut options = OptionRegistry::new();
        EngineConfig::register_options(&config, &mut options);

        let names: Vec<_> = options.list_all().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Threads", "Hash", "Move Overhead"]);
    }
}
