//! Version comparison and constraint operators.
//!
//! Versions are compared as byte strings with one refinement: wherever both
//! sides have a run of ASCII digits at the same position, the runs are
//! compared as numbers. A longer run is larger (leading zeros are not
//! stripped), and runs of equal length compare digit by digit. All other
//! bytes compare by value. When one version is a prefix of the other, the
//! shorter one is older.

/// Compare two version strings.
///
/// Returns:
/// - `> 0` if `a` is newer than `b`
/// - `0` if `a` and `b` are equal
/// - `< 0` if `a` is older than `b`
///
/// # Examples
///
/// ```
/// use libpcmeta::version::compare;
///
/// assert!(compare("1.2.3", "1.2.2") > 0);
/// assert!(compare("1.2.3", "1.2.3") == 0);
/// assert!(compare("1.10", "1.9") > 0);
/// assert!(compare("1.2", "1.2.0") < 0);
/// ```
pub fn compare(a: &str, b: &str) -> i32 {
    let mut va = a.as_bytes();
    let mut vb = b.as_bytes();
    let mut i = 0;

    while i < va.len() && i < vb.len() {
        let (ca, cb) = (va[i], vb[i]);
        if !ca.is_ascii_digit() || !cb.is_ascii_digit() {
            if ca != cb {
                return if ca < cb { -1 } else { 1 };
            }
            i += 1;
            continue;
        }

        let (da, ta) = split_digits(&va[i..]);
        let (db, tb) = split_digits(&vb[i..]);
        if da.len() != db.len() {
            return if da.len() < db.len() { -1 } else { 1 };
        }
        for (x, y) in da.iter().zip(db) {
            if x != y {
                return if x < y { -1 } else { 1 };
            }
        }
        va = ta;
        vb = tb;
        i = 0;
    }

    match va.len().cmp(&vb.len()) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Equal => 0,
    }
}

/// Split a leading run of ASCII digits off `s`.
fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let n = s.iter().take_while(|c| c.is_ascii_digit()).count();
    s.split_at(n)
}

/// Version comparison operators accepted in requirement lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `=`
    Equal,
    /// `>=`
    GreaterThanEqual,
    /// `>`
    GreaterThan,
}

impl Comparator {
    /// Recognize a whole token as an operator.
    ///
    /// Only exact matches count; `==` and `!=` are not operators.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "<" => Some(Self::LessThan),
            "<=" => Some(Self::LessThanEqual),
            "=" => Some(Self::Equal),
            ">=" => Some(Self::GreaterThanEqual),
            ">" => Some(Self::GreaterThan),
            _ => None,
        }
    }

    /// Get the string representation of this comparator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanEqual => "<=",
            Self::Equal => "=",
            Self::GreaterThanEqual => ">=",
            Self::GreaterThan => ">",
        }
    }

    /// Evaluate whether the comparison `actual <op> target` is satisfied.
    pub fn eval(self, actual: &str, target: &str) -> bool {
        let cmp = compare(actual, target);
        match self {
            Self::LessThan => cmp < 0,
            Self::LessThanEqual => cmp <= 0,
            Self::Equal => cmp == 0,
            Self::GreaterThanEqual => cmp >= 0,
            Self::GreaterThan => cmp > 0,
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
