/// Print `<message>: <error>` to stderr and exit with status 1.
macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod features_ops;
pub mod model_ops;
pub mod phrase_table_ops;
pub mod train_ops;
