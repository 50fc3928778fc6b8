//! Method detection and listing.
//!
//! Methods are listed at one of five levels, from "what should be used
//! here" to "everything registered":
//!
//! | Level | Includes |
//! |---|---|
//! | [`ListLevel::Recommended`] | real, not fake, environment looks suitable |
//! | [`ListLevel::RecommendedWithFake`] | real, environment looks suitable |
//! | [`ListLevel::RealNonFake`] | real, not fake |
//! | [`ListLevel::Real`] | real |
//! | [`ListLevel::All`] | every registered method |

use std::fmt;
use std::path::Path;

use tracing::trace;

use crate::backend::Method;
use crate::{MethodId, MethodRegistry};

/// Filter applied when listing methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ListLevel {
    /// Suitable for the current environment, excluding faked methods.
    #[default]
    Recommended,
    /// Suitable for the current environment, including faked methods.
    RecommendedWithFake,
    /// Every real method that is not faked.
    RealNonFake,
    /// Every real method.
    Real,
    /// Every registered method.
    All,
}

impl ListLevel {
    /// Every level, strictest first.
    pub const ALL: [ListLevel; 5] = [
        ListLevel::Recommended,
        ListLevel::RecommendedWithFake,
        ListLevel::RealNonFake,
        ListLevel::Real,
        ListLevel::All,
    ];

    /// Integer form, 0 to 4.
    pub const fn value(self) -> u8 {
        match self {
            Self::Recommended => 0,
            Self::RecommendedWithFake => 1,
            Self::RealNonFake => 2,
            Self::Real => 3,
            Self::All => 4,
        }
    }

    /// Decodes the integer form.
    pub fn from_value(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.value() == value)
    }

    /// Whether `method` is listed at this level.
    pub fn admits(self, method: &dyn Method) -> bool {
        let caps = method.capabilities();
        match self {
            Self::Recommended => caps.real && !caps.fake && method.environment_suitable(),
            Self::RecommendedWithFake => caps.real && method.environment_suitable(),
            Self::RealNonFake => caps.real && !caps.fake,
            Self::Real => caps.real,
            Self::All => true,
        }
    }
}

impl fmt::Display for ListLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recommended => "recommended",
            Self::RecommendedWithFake => "recommended-with-fake",
            Self::RealNonFake => "real-non-fake",
            Self::Real => "real",
            Self::All => "all",
        })
    }
}

/// Information about a registered method.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Method identifier.
    pub id: MethodId,
    /// Human-readable description.
    pub description: &'static str,
    /// Whether the environment looks suitable.
    pub suitable: bool,
    /// Whether the method is a real backend.
    pub real: bool,
    /// Whether the method is faked.
    pub fake: bool,
}

/// Methods of the global registry listed at `level`, in identifier order.
pub fn list_methods(level: ListLevel) -> Vec<MethodId> {
    list_methods_in(MethodRegistry::global(), level)
}

/// Methods of `registry` listed at `level`, in identifier order.
pub fn list_methods_in(registry: &MethodRegistry, level: ListLevel) -> Vec<MethodId> {
    let ids: Vec<MethodId> = registry
        .methods()
        .filter(|m| level.admits(*m))
        .map(|m| m.id())
        .collect();
    trace!(%level, methods = ?ids, "listed methods");
    ids
}

/// First method of `registry` at the strictest level that lists any.
pub fn select_method(registry: &MethodRegistry) -> Option<MethodId> {
    ListLevel::ALL
        .into_iter()
        .find_map(|level| list_methods_in(registry, level).into_iter().next())
}

/// Detects every registered method.
pub fn detect_methods(registry: &MethodRegistry) -> Vec<MethodInfo> {
    registry
        .methods()
        .map(|m| {
            let caps = m.capabilities();
            MethodInfo {
                id: m.id(),
                description: m.id().description(),
                suitable: m.environment_suitable(),
                real: caps.real,
                fake: caps.fake,
            }
        })
        .collect()
}

/// Get description of registered methods.
pub fn describe_methods(registry: &MethodRegistry) -> String {
    let mut desc = String::new();
    for info in detect_methods(registry) {
        let status = if info.suitable { "+" } else { "-" };
        let kind = match (info.real, info.fake) {
            (true, true) => "real, fake",
            (true, false) => "real",
            (false, true) => "fake",
            (false, false) => "virtual",
        };
        desc.push_str(&format!(
            "[{}] {} ({}): {}\n",
            status, info.id, kind, info.description
        ));
    }
    desc
}

/// Whether `path` names a virtual terminal: `/dev/tty` followed by a
/// number that does not start with `0`.
pub fn is_vt_path(path: &Path) -> bool {
    let Some(number) = path.to_str().and_then(|p| p.strip_prefix("/dev/tty")) else {
        return false;
    };
    matches!(number.as_bytes().first(), Some(b'1'..=b'9'))
        && number.bytes().all(|b| b.is_ascii_digit())
}

/// Whether standard input, output or error, or the controlling terminal,
/// is a virtual terminal.
#[cfg(unix)]
pub fn is_proper_vt() -> bool {
    use std::os::fd::AsRawFd;

    let fd_is_vt = |fd: i32| {
        std::fs::read_link(format!("/proc/self/fd/{fd}")).is_ok_and(|target| is_vt_path(&target))
    };
    if (0..3).any(fd_is_vt) {
        return true;
    }
    match std::fs::File::open("/dev/tty") {
        Ok(tty) => fd_is_vt(tty.as_raw_fd()),
        Err(_) => false,
    }
}

/// Whether standard input, output or error, or the controlling terminal,
/// is a virtual terminal.
#[cfg(not(unix))]
pub fn is_proper_vt() -> bool {
    false
}
