//! C++ header parsing
//!
//! Extracts the dependency-relevant surface of a header: include
//! directives, the owning module's `FOO_API` macro, reflected type
//! definitions, interface classes, and `_Implementation` methods wrongly
//! marked `override`.

use regex::Regex;
use std::sync::OnceLock;

fn quote_include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"#include\s+"([^"]+)""#).unwrap())
}

fn angle_include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#include\s+<([^>]+)>").unwrap())
}

fn reflected_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // The optional group skips the module API macro between the keyword
        // and the type name (`class GAME_API ATurret`)
        Regex::new(
            r"(UCLASS|USTRUCT|UENUM)\s*\([^)]*\)\s*\n*\s*(class|struct|enum\s+class)\s+(?:\w+_API\s+)?(\w+)",
        )
        .unwrap()
    })
}

fn interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"class\s+\w+_API\s+I(\w+)").unwrap())
}

fn override_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"virtual\s+\w+\s+(\w+)\s*\([^)]*\)\s*override").unwrap())
}

fn api_macro_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)_API").unwrap())
}

/// An include directive found in a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub path: String,
    /// `#include <...>` (system/engine headers) vs `#include "..."`
    pub angle: bool,
}

/// A reflected type definition (UCLASS/USTRUCT/UENUM)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    /// The reflection macro: "UCLASS", "USTRUCT", or "UENUM"
    pub macro_kind: String,
}

/// Everything the crawler needs from one header
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    pub includes: Vec<Include>,
    /// Module name from the first `FOO_API` occurrence
    pub module: Option<String>,
    pub types: Vec<TypeDef>,
    /// Interface class names, `I` prefix included
    pub interfaces: Vec<String>,
    /// `Name_Implementation` methods declared with `override`
    pub implementation_overrides: Vec<String>,
}

/// Parse a header's content
pub fn parse(content: &str) -> HeaderInfo {
    let mut includes: Vec<Include> = quote_include_re()
        .captures_iter(content)
        .map(|cap| Include {
            path: cap[1].to_string(),
            angle: false,
        })
        .collect();
    includes.extend(angle_include_re().captures_iter(content).map(|cap| Include {
        path: cap[1].to_string(),
        angle: true,
    }));

    let module = api_macro_re()
        .captures(content)
        .map(|cap| cap[1].to_string());

    let types = reflected_type_re()
        .captures_iter(content)
        .map(|cap| TypeDef {
            name: cap[3].to_string(),
            macro_kind: cap[1].to_string(),
        })
        .collect();

    let interfaces = interface_re()
        .captures_iter(content)
        .map(|cap| format!("I{}", &cap[1]))
        .collect();

    let implementation_overrides = override_re()
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .filter(|name| name.contains("Implementation"))
        .collect();

    HeaderInfo {
        includes,
        module,
        types,
        interfaces,
        implementation_overrides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"
#pragma once

#include "CoreMinimal.h"
#include "GameFramework/Actor.h"
#include <vector>
#include "Turret.generated.h"

UCLASS(Blueprintable)
class GAME_API ATurret : public AActor
{
    GENERATED_BODY()

public:
    virtual void Tick(float DeltaTime) override;
};

USTRUCT(BlueprintType)
struct FTurretConfig
{
    GENERATED_BODY()
};

UENUM(BlueprintType)
enum class ETurretState : uint8
{
    Idle,
    Firing
};
"#;

    #[test]
    fn test_parse_includes() {
        let info = parse(HEADER);
        let quoted: Vec<&str> = info
            .includes
            .iter()
            .filter(|i| !i.angle)
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(
            quoted,
            vec!["CoreMinimal.h", "GameFramework/Actor.h", "Turret.generated.h"]
        );

        let angled: Vec<&str> = info
            .includes
            .iter()
            .filter(|i| i.angle)
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(angled, vec!["vector"]);
    }

    #[test]
    fn test_parse_module_from_api_macro() {
        let info = parse(HEADER);
        assert_eq!(info.module.as_deref(), Some("GAME"));
    }

    #[test]
    fn test_parse_reflected_types() {
        let info = parse(HEADER);
        let names: Vec<&str> = info.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ATurret", "FTurretConfig", "ETurretState"]);
        assert_eq!(info.types[0].macro_kind, "UCLASS");
        assert_eq!(info.types[2].macro_kind, "UENUM");
    }

    #[test]
    fn test_parse_interface() {
        let info = parse("class GAME_API IDamageable\n{\npublic:\n};\n");
        assert_eq!(info.interfaces, vec!["IDamageable"]);
    }

    #[test]
    fn test_implementation_override_detected() {
        let info = parse(
            "class GAME_API UHealth {\n\
             virtual void OnDamaged_Implementation(float Amount) override;\n\
             virtual void Tick(float DeltaTime) override;\n\
             };\n",
        );
        assert_eq!(
            info.implementation_overrides,
            vec!["OnDamaged_Implementation"]
        );
    }

    #[test]
    fn test_empty_header() {
        let info = parse("#pragma once\n");
        assert!(info.includes.is_empty());
        assert!(info.module.is_none());
        assert!(info.types.is_empty());
    }
}
