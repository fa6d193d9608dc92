//! Storage backend selection for DR creation.
//!
//! Bootstrap backup/restore needs a storage config. Selection is
//! explicit: either the operator names one, or exactly one must exist.
//! Several configs with no name given is an error, never a silent pick.

use duplex_model::{CustomerConfig, StorageConfigId};

use crate::error::DrError;

/// How to pick the storage config backing bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageConfigChoice {
    /// Use the only storage config; fail if there are zero or several.
    #[default]
    Sole,
    /// Use the storage config with this name.
    Named(String),
}

/// Resolve a choice against the customer's storage configs.
pub fn select_storage_config(
    configs: &[CustomerConfig],
    choice: &StorageConfigChoice,
) -> Result<StorageConfigId, DrError> {
    match choice {
        StorageConfigChoice::Named(name) => configs
            .iter()
            .find(|c| &c.config_name == name)
            .map(|c| c.config_uuid.clone())
            .ok_or_else(|| DrError::StorageConfigNotFound(format!("no config named '{name}'"))),
        StorageConfigChoice::Sole => match configs {
            [] => Err(DrError::StorageConfigNotFound(
                "no storage configs exist; at least one is required for DR setup".to_string(),
            )),
            [only] => Ok(only.config_uuid.clone()),
            several => Err(DrError::Conflict(format!(
                "{} storage configs exist; name the one to use",
                several.len()
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(uuid: &str, name: &str) -> CustomerConfig {
        CustomerConfig {
            config_uuid: uuid.to_string(),
            config_name: name.to_string(),
            config_type: "STORAGE".to_string(),
        }
    }

    #[test]
    fn sole_config_is_selected() {
        let configs = vec![config("s-1", "minio")];
        let selected = select_storage_config(&configs, &StorageConfigChoice::Sole).unwrap();
        assert_eq!(selected, "s-1");
    }

    #[test]
    fn sole_fails_on_empty() {
        let err = select_storage_config(&[], &StorageConfigChoice::Sole).unwrap_err();
        assert!(matches!(err, DrError::StorageConfigNotFound(_)));
    }

    #[test]
    fn sole_fails_on_ambiguity() {
        let configs = vec![config("s-1", "minio"), config("s-2", "gcs")];
        let err = select_storage_config(&configs, &StorageConfigChoice::Sole).unwrap_err();
        assert!(matches!(err, DrError::Conflict(_)));
    }

    #[test]
    fn named_choice_matches_by_name() {
        let configs = vec![config("s-1", "minio"), config("s-2", "gcs")];
        let selected = select_storage_config(
            &configs,
            &StorageConfigChoice::Named("gcs".to_string()),
        )
        .unwrap();
        assert_eq!(selected, "s-2");
    }

    #[test]
    fn named_choice_fails_on_unknown_name() {
        let configs = vec![config("s-1", "minio")];
        let err = select_storage_config(
            &configs,
            &StorageConfigChoice::Named("s3".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, DrError::StorageConfigNotFound(_)));
    }
}
