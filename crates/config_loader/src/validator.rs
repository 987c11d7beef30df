//! Configuration validation
//!
//! Rules:
//! - backend names non-empty and unique
//! - param keys non-empty
//!
//! Non-fatal findings are reported by [`collect_warnings`].

use std::collections::HashSet;

use contracts::{ContractError, DispatchBlueprint};

/// Validate a DispatchBlueprint
///
/// Returns the first error found, or Ok(()).
pub fn validate(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    validate_backend_names(blueprint)?;
    validate_params(blueprint)?;
    Ok(())
}

fn validate_backend_names(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, backend) in blueprint.backends.iter().enumerate() {
        if backend.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("backends[{}].name", idx),
                "backend name cannot be empty",
            ));
        }
        if !seen.insert(backend.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("backends[name={}]", backend.name),
                "duplicate backend name",
            ));
        }
    }
    Ok(())
}

fn validate_params(blueprint: &DispatchBlueprint) -> Result<(), ContractError> {
    for backend in &blueprint.backends {
        if backend.params.keys().any(|k| k.trim().is_empty()) {
            return Err(ContractError::config_validation(
                format!("backends[{}].params", backend.name),
                "param keys cannot be empty",
            ));
        }
    }
    Ok(())
}

/// Collect non-fatal configuration issues
pub fn collect_warnings(blueprint: &DispatchBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.backends.is_empty() {
        warnings.push("No backends configured - tracked data will go nowhere".to_string());
    }

    for backend in &blueprint.backends {
        let policy = backend.policy();
        if policy.accepted_levels().is_empty() {
            warnings.push(format!(
                "Backend '{}' handles no levels - every leveled call will be dropped",
                backend.name
            ));
        }
        let bypassing = policy.bypass_levels_in_use();
        if !bypassing.is_empty() {
            warnings.push(format!(
                "Backend '{}' bypasses the PII check for {}",
                backend.name, bypassing
            ));
        }
    }

    if !blueprint.dispatch.isolate_faults {
        warnings.push(
            "dispatch.isolate_faults is false - a panicking backend aborts the broadcast"
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BackendConfig, BackendType, DispatchSettings, LevelSet, PiiLevel};
    use std::collections::HashMap;

    fn backend(name: &str) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            backend_type: BackendType::Log,
            handles_levels: LevelSet::from([PiiLevel::None]),
            bypass_levels: LevelSet::empty(),
            params: HashMap::new(),
        }
    }

    fn blueprint(backends: Vec<BackendConfig>) -> DispatchBlueprint {
        DispatchBlueprint {
            backends,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_blueprint() {
        let bp = blueprint(vec![backend("a"), backend("b")]);
        assert!(validate(&bp).is_ok());
        assert!(collect_warnings(&bp).is_empty());
    }

    #[test]
    fn test_duplicate_backend_name() {
        let bp = blueprint(vec![backend("a"), backend("a")]);
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_empty_backend_name() {
        let bp = blueprint(vec![backend(" ")]);
        assert!(matches!(
            validate(&bp),
            Err(ContractError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_empty_param_key() {
        let mut b = backend("a");
        b.params.insert(String::new(), "x".to_string());
        assert!(validate(&blueprint(vec![b])).is_err());
    }

    #[test]
    fn test_warnings() {
        let mut bypassing = backend("bypassing");
        bypassing.bypass_levels = LevelSet::from([PiiLevel::VerySensitive]);
        let mut deaf = backend("deaf");
        deaf.handles_levels = LevelSet::empty();

        let mut bp = blueprint(vec![bypassing, deaf]);
        bp.dispatch = DispatchSettings {
            isolate_faults: false,
        };

        let warnings = collect_warnings(&bp);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("very_sensitive"));
        assert!(warnings[1].contains("deaf"));

        assert_eq!(collect_warnings(&blueprint(vec![])).len(), 1);
    }
}
