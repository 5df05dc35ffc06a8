pub use crate::catalog::Catalog;
pub use crate::config::*;

/// A builder for assembling a catalog of nominations.
///
/// Every nomination is checked when it is added, so a builder that accepted
/// all its nominations always yields a valid catalog.
///
/// ```
/// pub use nomination_ballot::builder::Builder;
/// pub use nomination_ballot::IconName;
/// # use nomination_ballot::CatalogError;
///
/// let mut builder = Builder::new();
/// builder.add_nomination(
///     "1",
///     "Best product",
///     "The most innovative product of the year",
///     IconName::Trophy,
///     &["Echo Pro".to_string(), "FitMax".to_string()],
/// )?;
///
/// let catalog = builder.build()?;
/// assert_eq!(catalog.len(), 1);
///
/// # Ok::<(), CatalogError>(())
/// ```
#[derive(Default)]
pub struct Builder {
    pub(crate) _nominations: Vec<Nomination>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _nominations: Vec::new(),
        }
    }

    /// Adds a nomination with its options, in display order.
    pub fn add_nomination(
        &mut self,
        id: &str,
        title: &str,
        description: &str,
        icon: IconName,
        options: &[String],
    ) -> Result<(), CatalogError> {
        self.add_nomination_2(&Nomination {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon,
            options: options.to_vec(),
        })
    }

    pub fn add_nomination_2(&mut self, nomination: &Nomination) -> Result<(), CatalogError> {
        if self._nominations.iter().any(|n| n.id == nomination.id) {
            return Err(CatalogError::DuplicateNomination(nomination.id.clone()));
        }
        if nomination.options.is_empty() {
            return Err(CatalogError::NoOptions(nomination.id.clone()));
        }
        for (idx, option) in nomination.options.iter().enumerate() {
            if nomination.options[..idx].contains(option) {
                return Err(CatalogError::DuplicateOption {
                    nomination_id: nomination.id.clone(),
                    option: option.clone(),
                });
            }
        }
        self._nominations.push(nomination.clone());
        Ok(())
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self._nominations.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Catalog::from_checked(self._nominations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_duplicate_nomination() {
        let mut builder = Builder::new();
        builder
            .add_nomination("1", "a", "", IconName::Leaf, &opts(&["x"]))
            .unwrap();
        let res = builder.add_nomination("1", "b", "", IconName::Leaf, &opts(&["y"]));
        assert_eq!(res, Err(CatalogError::DuplicateNomination("1".to_string())));
    }

    #[test]
    fn rejects_duplicate_option() {
        let mut builder = Builder::new();
        let res = builder.add_nomination("1", "a", "", IconName::Leaf, &opts(&["x", "y", "x"]));
        assert_eq!(
            res,
            Err(CatalogError::DuplicateOption {
                nomination_id: "1".to_string(),
                option: "x".to_string()
            })
        );
    }

    #[test]
    fn rejects_nomination_without_options() {
        let mut builder = Builder::new();
        let res = builder.add_nomination("1", "a", "", IconName::Leaf, &[]);
        assert_eq!(res, Err(CatalogError::NoOptions("1".to_string())));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(Builder::new().build().err(), Some(CatalogError::Empty));
    }

    #[test]
    fn keeps_declaration_order() {
        let mut builder = Builder::new();
        builder
            .add_nomination("b", "B", "", IconName::Rocket, &opts(&["z", "a"]))
            .unwrap();
        builder
            .add_nomination("a", "A", "", IconName::Users, &opts(&["m"]))
            .unwrap();
        let catalog = builder.build().unwrap();
        let ids: Vec<&str> = catalog.nominations().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(catalog.get("b").unwrap().options, opts(&["z", "a"]));
    }
}
