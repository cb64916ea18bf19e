//! Track Context - Value Objects
//!
//! 曲目指纹：用于判断两个不同 uri 的曲目是否其实是同一首歌

use std::collections::BTreeSet;

use super::Track;

/// 艺人名分隔符
const ARTIST_DELIMITERS: [char; 2] = [',', '&'];

/// 标题中 "合作艺人" 标记，遇到即截断（首词除外）
const FEATURE_MARKERS: [&str; 3] = ["feat.", "ft.", "featuring"];

/// 曲目指纹
///
/// 不变量:
/// - 同一个 Track 多次计算结果相同
/// - 艺人顺序不影响结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    /// 小写标题词（去掉括号注释与 feat. 部分）
    title_words: BTreeSet<String>,
    /// 小写艺人名
    artist_names: BTreeSet<String>,
}

impl Fingerprint {
    pub fn of(track: &Track) -> Self {
        Self {
            title_words: title_words(track.title()).into_iter().collect(),
            artist_names: split_artists(track.author().unwrap_or_default())
                .into_iter()
                .collect(),
        }
    }

    pub fn title_words(&self) -> &BTreeSet<String> {
        &self.title_words
    }

    pub fn artist_names(&self) -> &BTreeSet<String> {
        &self.artist_names
    }

    /// |self.title ∩ seed.title| / max(1, |seed.title|)
    pub fn title_overlap(&self, seed: &Fingerprint) -> f64 {
        let shared = self.title_words.intersection(&seed.title_words).count();
        shared as f64 / seed.title_words.len().max(1) as f64
    }

    /// 完全相同的艺人名数量
    pub fn artist_overlap(&self, seed: &Fingerprint) -> usize {
        self.artist_names.intersection(&seed.artist_names).count()
    }
}

/// 将 author 拆分为小写、去空白的艺人名列表（保持原顺序）
pub fn split_artists(author: &str) -> Vec<String> {
    author
        .to_lowercase()
        .split(|c| ARTIST_DELIMITERS.contains(&c))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// 去掉 (...) 与 [...] 片段，未闭合的括号吞掉其后全部内容
fn strip_annotations(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut depth = 0usize;
    for c in title.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn title_words(title: &str) -> Vec<String> {
    let cleaned = strip_annotations(title).to_lowercase();
    cleaned
        .split_whitespace()
        .enumerate()
        .take_while(|(i, word)| *i == 0 || !FEATURE_MARKERS.contains(word))
        .map(|(_, word)| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_annotations_are_stripped() {
        let track = Track::new("a", "Song Title (Live) [2011 Remaster]");
        let fp = Fingerprint::of(&track);
        let words: Vec<_> = fp.title_words().iter().cloned().collect();
        assert_eq!(words, vec!["song", "title"]);
    }

    #[test]
    fn test_feature_credit_is_dropped() {
        let a = Fingerprint::of(&Track::new("a", "Blinding Lights feat. Someone"));
        let b = Fingerprint::of(&Track::new("b", "Blinding Lights ft. Other"));
        assert_eq!(a.title_words(), b.title_words());
        assert_eq!(a.title_words().len(), 2);
    }

    #[test]
    fn test_leading_marker_like_word_is_kept() {
        let fp = Fingerprint::of(&Track::new("a", "Ft Lauderdale Nights"));
        let words: Vec<_> = fp.title_words().iter().cloned().collect();
        assert_eq!(words, vec!["ft", "lauderdale", "nights"]);

        // 无句点的 ft/feat 只是普通词
        let fp = Fingerprint::of(&Track::new("b", "Feat Of Strength"));
        assert_eq!(fp.title_words().len(), 3);
    }

    #[test]
    fn test_unclosed_bracket_swallows_rest() {
        let fp = Fingerprint::of(&Track::new("a", "Intro (unfinished mix"));
        assert_eq!(fp.title_words().len(), 1);
        assert!(fp.title_words().contains("intro"));
    }

    #[test]
    fn test_artist_split_on_comma_and_ampersand() {
        assert_eq!(
            split_artists("Simon & Garfunkel, Paul Simon"),
            vec!["simon", "garfunkel", "paul simon"]
        );
        assert!(split_artists("").is_empty());
        assert!(split_artists(" , & ").is_empty());
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let track = Track::new("a", "Song (Live)").with_author("X, Y");
        assert_eq!(Fingerprint::of(&track), Fingerprint::of(&track));
    }

    #[test]
    fn test_fingerprint_ignores_artist_order() {
        let a = Track::new("a", "Song").with_author("X, Y & Z");
        let b = Track::new("a", "Song").with_author("Z & X, Y");
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_title_overlap_ratio() {
        let seed = Fingerprint::of(&Track::new("a", "one two three four"));
        let cand = Fingerprint::of(&Track::new("b", "one two three five"));
        assert!((cand.title_overlap(&seed) - 0.75).abs() < f64::EPSILON);

        // 种子标题为空时分母取 1
        let empty_seed = Fingerprint::of(&Track::new("a", "(Live)"));
        assert_eq!(cand.title_overlap(&empty_seed), 0.0);
    }
}
