use indexmap::IndexSet;
use std::path::PathBuf;

pub trait Combine {
    /// Combine two values, preferring the values in `self`.
    ///
    /// A layer that sets a key wins over every lower layer, even when the value equals the
    /// built-in default. A layer that leaves a key unset keeps the lower layer's value.
    /// Collections are replaced as a whole rather than merged.
    #[must_use]
    fn combine(self, other: Self) -> Self;
}

macro_rules! impl_combine_or {
    ($name:ty) => {
        impl Combine for Option<$name> {
            fn combine(self, other: Option<$name>) -> Option<$name> {
                self.or(other)
            }
        }
    };
}

impl_combine_or!(String);
impl_combine_or!(PathBuf);
impl_combine_or!(IndexSet<String>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_wins() {
        assert_eq!(
            Some("swift".to_owned()).combine(Some("kt".to_owned())),
            Some("swift".to_owned())
        );
        assert_eq!(
            Option::<PathBuf>::None.combine(Some(PathBuf::from("out"))),
            Some(PathBuf::from("out"))
        );
        assert_eq!(Option::<PathBuf>::None.combine(None), None);
    }

    #[test]
    fn test_sets_are_replaced_not_merged() {
        let higher: IndexSet<String> = ["build".to_owned()].into_iter().collect();
        let lower: IndexSet<String> = ["Pods".to_owned(), "build".to_owned()].into_iter().collect();

        let merged = Some(higher.clone()).combine(Some(lower));
        assert_eq!(merged, Some(higher));
    }
}
