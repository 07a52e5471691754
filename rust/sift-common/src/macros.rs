/// Unwraps an `Ok` value inside a function returning `Option<Result<T, E>>`,
/// such as `Iterator::next` of a fallible iterator; an `Err` is returned as
/// `Some(Err(..))`.
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => return Some(Err(err)),
        }
    };
}
