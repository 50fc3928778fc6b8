//! Error catalog lookup.

use crate::ErrorArgs;
use anyhow::{Result, bail};
use gamma_core::{Error, ErrorCode};

/// Describes one error by code or name, or lists the library catalog.
pub fn run(args: ErrorArgs, verbose: bool) -> Result<()> {
    let Some(query) = args.code else {
        for code in ErrorCode::ALL {
            if verbose {
                println!("{:>4}  {:<40} {}", code.value(), code.name(), code.description());
            } else {
                println!("{:>4}  {}", code.value(), code.name());
            }
        }
        return Ok(());
    };

    let error = lookup(&query)?;
    match error.library_code() {
        Some(code) => println!("{} {}: {}", code.value(), code.name(), code.description()),
        None => println!("{} (OS error): {}", error.code(), error),
    }
    Ok(())
}

fn lookup(query: &str) -> Result<Error> {
    let query = query.trim();
    if let Ok(value) = query.parse::<i32>() {
        return match Error::from_code(value) {
            Some(error) => Ok(error),
            None if value == 0 => bail!("0 means success"),
            None => bail!("No library error has code {}", value),
        };
    }
    match ErrorCode::from_name(&query.to_ascii_uppercase()) {
        Some(code) => Ok(code.into()),
        None => bail!("Unknown error name '{}'", query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(
            lookup("-29").unwrap().library_code(),
            Some(ErrorCode::EdidWrongMagicNumber)
        );
        assert_eq!(
            lookup("edid_wrong_magic_number").unwrap().library_code(),
            Some(ErrorCode::EdidWrongMagicNumber)
        );
        assert_eq!(lookup("12").unwrap(), Error::Os(12));
        assert!(lookup("0").is_err());
        assert!(lookup("-47").is_err());
        assert!(lookup("NO_SUCH_THING").is_err());
    }
}
