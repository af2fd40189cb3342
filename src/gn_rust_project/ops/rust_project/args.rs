//! Scanning of `rustc` command-line arguments.

/// Edition assumed when no `--edition` flag is passed, matching `rustc`.
pub const DEFAULT_EDITION: &str = "2015";

/// Returns the argument following the first standalone occurrence of `flag`.
///
/// A trailing `flag` with nothing after it has no value.
pub fn find_arg_value<'a>(flag: &str, args: &'a [String]) -> Option<&'a str> {
    args.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
}

/// Returns the rest of the first argument starting with `prefix`.
pub fn find_arg_value_after_prefix<'a>(prefix: &str, args: &'a [String]) -> Option<&'a str> {
    args.iter().find_map(|arg| arg.strip_prefix(prefix))
}

/// Returns the rest of every argument starting with `prefix`, in order.
pub fn find_all_arg_values_after_prefix<'a>(
    prefix: &'a str,
    args: &'a [String],
) -> impl Iterator<Item = &'a str> + 'a {
    args.iter().filter_map(move |arg| arg.strip_prefix(prefix))
}

/// The compilation target triple, from `--target <triple>` or, failing that,
/// `--target=<triple>`.
pub fn compiler_target(args: &[String]) -> Option<&str> {
    find_arg_value("--target", args).or_else(|| find_arg_value_after_prefix("--target=", args))
}

/// The language edition, from `--edition=<edition>` or, failing that,
/// `--edition <edition>`.
pub fn edition(args: &[String]) -> &str {
    find_arg_value_after_prefix("--edition=", args)
        .or_else(|| find_arg_value("--edition", args))
        .unwrap_or(DEFAULT_EDITION)
}

/// Values of every `--cfg=` argument.
pub fn cfgs(args: &[String]) -> impl Iterator<Item = &str> {
    find_all_arg_values_after_prefix("--cfg=", args)
}
