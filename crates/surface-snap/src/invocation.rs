//! Command-line style invocation of the tool:
//!
//! `surface-snap <object> [-r|-rotation <bool>] [-ilf|-instanceLeaf <bool>] [-d|-dummy <bool>]`

use shared::{ObjectId, ToolOptions};

use crate::error::{Result, ToolError};

/// Validated tool arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Object to duplicate
    pub source: ObjectId,
    pub options: ToolOptions,
}

impl ToolInvocation {
    pub fn new(source: impl Into<ObjectId>, options: ToolOptions) -> Self {
        Self {
            source: source.into(),
            options,
        }
    }

    /// Parse arguments (without the command name). Flags left out keep the
    /// value from `defaults`.
    pub fn parse<S: AsRef<str>>(args: &[S], defaults: &ToolOptions) -> Result<Self> {
        let mut options = defaults.clone();
        let mut objects: Vec<&str> = Vec::new();

        let mut iter = args.iter().map(AsRef::as_ref);
        while let Some(arg) = iter.next() {
            if !arg.starts_with('-') {
                objects.push(arg);
                continue;
            }
            let value = iter.next().unwrap_or("");
            let flag = parse_bool(arg, value);
            match arg {
                "-r" | "-rotation" => options.rotation = flag?,
                "-ilf" | "-instanceLeaf" => options.instance_leaf = flag?,
                // accepted for compatibility, no effect
                "-d" | "-dummy" => {
                    flag?;
                }
                _ => return Err(ToolError::UnknownFlag(arg.to_string())),
            }
        }

        match objects.as_slice() {
            [] => Err(ToolError::MissingTarget),
            [source] => Ok(Self::new(*source, options)),
            many => Err(ToolError::MultipleTargets(many.len())),
        }
    }
}

fn parse_bool(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ToolError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ToolInvocation> {
        ToolInvocation::parse(args, &ToolOptions::default())
    }

    #[test]
    fn test_defaults() {
        let inv = parse(&["pCube1"]).unwrap();
        assert_eq!(inv.source, "pCube1");
        assert!(inv.options.rotation);
        assert!(!inv.options.instance_leaf);
    }

    #[test]
    fn test_short_and_long_flags() {
        let inv = parse(&["-r", "false", "pCube1", "-instanceLeaf", "On"]).unwrap();
        assert!(!inv.options.rotation);
        assert!(inv.options.instance_leaf);

        let inv = parse(&["pCube1", "-rotation", "0", "-ilf", "yes", "-d", "1"]).unwrap();
        assert!(!inv.options.rotation);
        assert!(inv.options.instance_leaf);
    }

    #[test]
    fn test_settings_defaults_apply() {
        let defaults = ToolOptions {
            rotation: false,
            instance_leaf: true,
        };
        let inv = ToolInvocation::parse(&["pCube1", "-r", "true"], &defaults).unwrap();
        assert!(inv.options.rotation);
        assert!(inv.options.instance_leaf);
    }

    #[test]
    fn test_target_count() {
        assert_eq!(parse(&[]), Err(ToolError::MissingTarget));
        assert_eq!(parse(&["-r", "true"]), Err(ToolError::MissingTarget));
        assert_eq!(parse(&["a", "b", "c"]), Err(ToolError::MultipleTargets(3)));
    }

    #[test]
    fn test_bad_flags() {
        assert_eq!(parse(&["a", "-x", "1"]), Err(ToolError::UnknownFlag("-x".into())));
        assert_eq!(
            parse(&["a", "-r", "maybe"]),
            Err(ToolError::InvalidFlagValue {
                flag: "-r".into(),
                value: "maybe".into()
            })
        );
        assert_eq!(
            parse(&["a", "-ilf"]),
            Err(ToolError::InvalidFlagValue {
                flag: "-ilf".into(),
                value: String::new()
            })
        );
    }
}
