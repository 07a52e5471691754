use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Returns an invalid-argument error naming `$name` unless `$expr` holds.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {
        if !$expr {
            return Err($crate::result::failed_check(
                true,
                stringify!($name),
                stringify!($expr),
            ));
        }
    };
}

/// Returns a format error naming `$name` unless `$expr` holds.
#[macro_export]
macro_rules! verify_data {
    ($name:expr, $expr:expr) => {
        if !$expr {
            return Err($crate::result::failed_check(
                false,
                stringify!($name),
                stringify!($expr),
            ));
        }
    };
}

#[doc(hidden)]
#[cold]
pub fn failed_check(argument: bool, name: &str, condition: &str) -> Error {
    if argument {
        Error::invalid_arg(name, condition)
    } else {
        Error::invalid_format(name, condition)
    }
}

#[cfg(test)]
mod tests {
    use crate::Result;

    fn check_k(k: usize) -> Result<usize> {
        verify_arg!(k, k > 0);
        Ok(k)
    }

    fn check_len(len: usize, limit: usize) -> Result<()> {
        verify_data!(len, len <= limit);
        Ok(())
    }

    #[test]
    fn test_verify_macros() {
        assert_eq!(check_k(3).unwrap(), 3);
        let err = check_k(0).unwrap_err();
        assert!(err.is_invalid_arg());
        assert_eq!(err.to_string(), "invalid argument k: k > 0");

        assert!(check_len(4, 4).is_ok());
        assert!(check_len(5, 4).unwrap_err().is_format_error());
    }
}
