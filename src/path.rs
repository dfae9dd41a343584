//! Resolution of user supplied path tokens against the tracked remote
//! working directory.
//!
//! Nothing here touches the network. Paths are plain strings using `/` as the
//! separator, since that is what FTP servers speak regardless of the local OS.

/// The server root as seen by a freshly logged in session.
pub const ROOT: &str = "./";

/// Resolves `path` against `cwd` into the path sent to the server.
///
/// Rules are applied to the raw token in this order:
///
/// 1. `""` or `"."` is the current directory.
/// 2. `"~"` is the root (`"./"`).
/// 3. `".."` is the parent of the current directory, see [`parent`].
/// 4. `"./rest"` is `cwd` followed by `rest`.
/// 5. `"/abs"` is taken as is.
/// 6. Anything else is appended to `cwd`.
///
/// No separator is ever inserted, so `resolve("bar", "/a/b")` yields
/// `"/a/bbar"`. Callers keep `cwd` terminated by `/` to avoid that.
///
/// ```rust
/// use agileftp::path::resolve;
///
/// assert_eq!(resolve("./foo", "/a/b/"), "/a/b/foo");
/// assert_eq!(resolve("/x/y", "/a/b/"), "/x/y");
/// assert_eq!(resolve("~", "/a/b/"), "./");
/// ```
pub fn resolve(path: &str, cwd: &str) -> String {
    match path {
        "" | "." => cwd.to_owned(),
        "~" => ROOT.to_owned(),
        ".." => parent(cwd),
        _ if path.starts_with("./") => format!("{}{}", cwd, &path[2..]),
        _ if path.starts_with('/') => path.to_owned(),
        _ => format!("{}{}", cwd, path),
    }
}

/// Drops the last directory of `cwd`.
///
/// `cwd` is expected to end with `/`, so splitting it yields a trailing empty
/// segment; the two last segments (the directory name and that empty string)
/// are removed and the rest is joined back, each followed by `/`.
///
/// Going above the root is not guarded: `parent("./")` is `""`.
pub fn parent(cwd: &str) -> String {
    let segments: Vec<&str> = cwd.split('/').collect();
    if segments.len() < 2 {
        return cwd.to_owned();
    }
    segments[..segments.len() - 2]
        .iter()
        .map(|segment| format!("{}/", segment))
        .collect()
}

/// Joins a directory and a file name the way remote targets are built for
/// transfers: `dir + "/" + name`, without collapsing duplicate separators.
pub fn join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir, name)
}

/// Appends `/` unless `path` already ends with one.
pub fn with_trailing_separator(path: String) -> String {
    if path.ends_with('/') {
        path
    } else {
        path + "/"
    }
}
