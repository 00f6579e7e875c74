mod pattern;
mod safelist;
mod verdict;

pub use pattern::{LiteralMode, Matcher, MatcherSet, PatternSource};
pub use safelist::{ComplexSafelist, Safelist, UserSafelist};
pub use verdict::{SelectorMatcher, Verdict, BUILTIN_DYNAMIC_ATTRIBUTES};
