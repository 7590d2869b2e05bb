//! Command-line parsing, exported from the library so tests can exercise it.
//!
//! The layout is fixed and positional: `compiler -S -o <output> <input>`
//! with an optional trailing `-O2`.

use std::path::PathBuf;

/// A fully-parsed compilation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub output: PathBuf,
    pub input: PathBuf,
    /// `-O2` was requested; recorded for the downstream pipeline.
    pub optimize: bool,
}

/// Parses the full `std::env::args()` slice, including `argv[0]`.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() != 5 && args.len() != 6 {
        return Err("expected: -S -o <output> <input> [-O2]".to_string());
    }
    if args[1] != "-S" {
        return Err(format!("unknown mode '{}', expected -S", args[1]));
    }
    if args[2] != "-o" {
        return Err(format!("expected -o, found '{}'", args[2]));
    }
    let output = PathBuf::from(&args[3]);
    let input = PathBuf::from(&args[4]);
    let optimize = match args.get(5) {
        None => false,
        Some(flag) if flag == "-O2" => true,
        Some(flag) => return Err(format!("unknown flag '{}'", flag)),
    };
    Ok(CliArgs {
        output,
        input,
        optimize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("compiler")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn plain_invocation() {
        let parsed = parse_args(&args(&["-S", "-o", "out.s", "in.sy"])).unwrap();
        assert_eq!(parsed.output, PathBuf::from("out.s"));
        assert_eq!(parsed.input, PathBuf::from("in.sy"));
        assert!(!parsed.optimize);
    }

    #[test]
    fn optimized_invocation() {
        let parsed = parse_args(&args(&["-S", "-o", "out.s", "in.sy", "-O2"])).unwrap();
        assert!(parsed.optimize);
    }

    #[test]
    fn rejects_wrong_mode() {
        assert!(parse_args(&args(&["-R", "-o", "out.s", "in.sy"])).is_err());
    }

    #[test]
    fn rejects_misplaced_flags() {
        assert!(parse_args(&args(&["-S", "in.sy", "-o", "out.s"])).is_err());
        assert!(parse_args(&args(&["-S", "-o", "out.s", "in.sy", "-O3"])).is_err());
        assert!(parse_args(&args(&["-S", "-o", "out.s"])).is_err());
    }
}
