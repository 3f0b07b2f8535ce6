//! Intent analysis: free text -> structured game intent.
//!
//! Keyword tables are matched in order and the first hit wins for each field.
//! Matching runs on a lowercased copy of the input. Chinese keywords match as
//! plain substrings. English keywords must stand as whole words (a plural
//! `s`/`es` is allowed), so "aftermath" is not math and "sword" is not word.

use crate::config::{DifficultyLevel, GameType};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const DEFAULT_AGE_GROUP: &str = "6-8";
pub const DEFAULT_THEME: &str = "adventure";
pub const DEFAULT_DURATION_MINUTES: u32 = 10;

static CATEGORY_KEYWORDS: &[(GameType, &[&str])] = &[
    (
        GameType::Math,
        &[
            "数学", "加法", "减法", "乘法", "除法", "计算", "算术",
            "math", "addition", "subtraction", "multiplication", "division", "arithmetic",
        ],
    ),
    (
        GameType::Word,
        &[
            "单词", "英语", "字母", "拼写", "词汇",
            "word", "english", "alphabet", "letter", "spelling", "vocabulary",
        ],
    ),
    (
        GameType::Memory,
        &["记忆", "记住", "配对", "记忆力", "memory", "memorize", "remember", "matching"],
    ),
    (GameType::Puzzle, &["拼图", "拼接", "组合", "puzzle", "jigsaw"]),
    (
        GameType::Drawing,
        &["画", "绘画", "涂鸦", "创作", "draw", "drawing", "paint", "painting", "doodle", "sketch"],
    ),
];

static DIFFICULTY_KEYWORDS: &[(DifficultyLevel, &[&str])] = &[
    (
        DifficultyLevel::Easy,
        &["简单", "容易", "基础", "入门", "easy", "simple", "beginner", "basic"],
    ),
    (
        DifficultyLevel::Medium,
        &["中等", "普通", "一般", "medium", "normal", "intermediate"],
    ),
    (
        DifficultyLevel::Hard,
        &["困难", "难", "挑战", "高级", "hard", "difficult", "challenge", "challenging", "advanced"],
    ),
    (
        DifficultyLevel::Adaptive,
        &["自适应", "递增", "渐进", "adaptive", "progressive"],
    ),
];

static THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("animals", &["动物", "小动物", "动物园", "animal", "zoo"]),
    ("space", &["太空", "宇宙", "星球", "火箭", "space", "rocket", "planet", "galaxy"]),
    (
        "fairy-tale",
        &["童话", "公主", "王子", "魔法", "fairy", "princess", "prince", "magic"],
    ),
    ("ocean", &["海洋", "海底", "鱼", "海", "ocean", "underwater", "fish"]),
    ("dinosaur", &["恐龙", "侏罗纪", "dinosaur", "jurassic"]),
    ("superhero", &["超级英雄", "英雄", "超人", "superhero", "hero"]),
];

static TIMER_KEYWORDS: &[&str] = &["计时", "时间", "timer", "timed"];

static AGE_ZH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*[-到至~]?\s*(\d+)?\s*岁").expect("Invalid age regex")
});

static AGE_EN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:-|to)?\s*(\d+)?\s*(?:years?|yrs?)\b").expect("Invalid age regex")
});

static DURATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:分钟|min(?:ute)?s?\b)").expect("Invalid duration regex"));

/// Structured reading of a game request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIntent {
    pub game_type: GameType,
    pub age_group: String,
    pub difficulty: DifficultyLevel,
    pub theme: String,
    pub title: String,
    pub timer_enabled: bool,
    pub duration_minutes: u32,
}

/// Keyword and pattern based intent extractor. Total: never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentAnalyzer;

impl IntentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, input: &str) -> GameIntent {
        let lowered = input.to_lowercase();

        let game_type = extract_game_type(&lowered);
        let theme = extract_theme(&lowered);
        let intent = GameIntent {
            game_type,
            age_group: extract_age_group(&lowered),
            difficulty: extract_difficulty(&lowered),
            title: generate_title(game_type, theme),
            theme: theme.to_string(),
            timer_enabled: contains_any(&lowered, TIMER_KEYWORDS),
            duration_minutes: extract_duration(&lowered),
        };

        tracing::debug!(?intent, "Analyzed intent");
        intent
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `keyword` occurs in the lowercased `input`. ASCII keywords need
/// word boundaries on both sides; CJK text has no spaces to bound on.
fn contains_keyword(input: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return input.contains(keyword);
    }
    input.match_indices(keyword).any(|(start, _)| {
        if input[..start].chars().next_back().is_some_and(is_word_char) {
            return false;
        }
        let rest = &input[start + keyword.len()..];
        let rest = rest
            .strip_prefix("es")
            .or_else(|| rest.strip_prefix('s'))
            .filter(|tail| !tail.starts_with(is_word_char))
            .unwrap_or(rest);
        !rest.starts_with(is_word_char)
    })
}

fn contains_any(input: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| contains_keyword(input, keyword))
}

fn first_match<T: Copy>(input: &str, table: &[(T, &[&str])]) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| contains_any(input, keywords))
        .map(|(value, _)| *value)
}

pub fn extract_game_type(input: &str) -> GameType {
    first_match(&input.to_lowercase(), CATEGORY_KEYWORDS).unwrap_or(GameType::Universal)
}

pub fn extract_difficulty(input: &str) -> DifficultyLevel {
    first_match(&input.to_lowercase(), DIFFICULTY_KEYWORDS).unwrap_or_default()
}

pub fn extract_theme(input: &str) -> &'static str {
    first_match(&input.to_lowercase(), THEME_KEYWORDS).unwrap_or(DEFAULT_THEME)
}

/// Age bracket such as `"6-8"`.
///
/// An explicit range is kept verbatim; a single age is binned into
/// `3-5`, `6-8` or `9-12`.
pub fn extract_age_group(input: &str) -> String {
    let lowered = input.to_lowercase();
    let captures = AGE_ZH_REGEX
        .captures(&lowered)
        .or_else(|| AGE_EN_REGEX.captures(&lowered));

    let Some(captures) = captures else {
        return DEFAULT_AGE_GROUP.to_string();
    };

    match (captures.get(1), captures.get(2)) {
        (Some(low), Some(high)) => format!("{}-{}", low.as_str(), high.as_str()),
        (Some(age), None) => bin_age(age.as_str()).to_string(),
        _ => DEFAULT_AGE_GROUP.to_string(),
    }
}

fn bin_age(age: &str) -> &'static str {
    match age.parse::<u32>() {
        Ok(0..=5) => "3-5",
        Ok(6..=8) => "6-8",
        // Ages too large for u32 are still older than 8.
        _ => "9-12",
    }
}

/// Duration in minutes; [`DEFAULT_DURATION_MINUTES`] when absent or out of range.
pub fn extract_duration(input: &str) -> u32 {
    DURATION_REGEX
        .captures(&input.to_lowercase())
        .and_then(|captures| captures.get(1))
        .and_then(|minutes| minutes.as_str().parse().ok())
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

fn theme_display_name(theme: &str) -> &'static str {
    match theme {
        "animals" => "小动物",
        "space" => "太空",
        "fairy-tale" => "童话",
        "ocean" => "海洋",
        "dinosaur" => "恐龙",
        "superhero" => "超级英雄",
        _ => "奇妙",
    }
}

pub fn generate_title(game_type: GameType, theme: &str) -> String {
    format!("{}{}", theme_display_name(theme), game_type.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(input: &str) -> GameIntent {
        IntentAnalyzer::new().analyze(input)
    }

    #[test]
    fn test_category_keywords() {
        assert_eq!(analyze("我想玩加法游戏").game_type, GameType::Math);
        assert_eq!(analyze("学习英语单词").game_type, GameType::Word);
        assert_eq!(analyze("锻炼记忆力").game_type, GameType::Memory);
        assert_eq!(analyze("来个拼图").game_type, GameType::Puzzle);
        assert_eq!(analyze("我想画画").game_type, GameType::Drawing);
        assert_eq!(analyze("做一个贪吃蛇").game_type, GameType::Universal);
    }

    #[test]
    fn test_category_first_match_wins() {
        // Both math and memory keywords present; math is listed first.
        assert_eq!(analyze("记忆乘法表").game_type, GameType::Math);
    }

    #[test]
    fn test_english_category_case_insensitive() {
        assert_eq!(
            analyze("Make me a MATH game for a 6 year old").game_type,
            GameType::Math
        );
        assert_eq!(analyze("a Memory matching game").game_type, GameType::Memory);
        assert_eq!(analyze("build a snake clone").game_type, GameType::Universal);
    }

    #[test]
    fn test_english_keywords_need_whole_words() {
        assert_eq!(analyze("a game about the aftermath of a storm").game_type, GameType::Universal);
        assert_eq!(analyze("a sword fighting game").game_type, GameType::Universal);
        assert_eq!(analyze("guess the password").game_type, GameType::Universal);
        assert_eq!(extract_difficulty("a hardware store game"), DifficultyLevel::Easy);
        assert_eq!(extract_theme("a selfish cat"), DEFAULT_THEME);
        assert_eq!(extract_duration("a quiz for 2 minecraft fans"), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn test_english_keywords_allow_plurals_and_cjk_neighbours() {
        assert_eq!(analyze("learn new words").game_type, GameType::Word);
        assert_eq!(analyze("planets and rockets").theme, "space");
        assert_eq!(extract_theme("two heroes"), "superhero");
        assert_eq!(analyze("做一个math游戏").game_type, GameType::Math);
        assert_eq!(analyze("Drawing time!").game_type, GameType::Drawing);
        assert_eq!(extract_duration("a 15 minutes game"), 15);
        assert_eq!(extract_duration("3mins"), 3);
        assert_eq!(extract_age_group("a 7 yearly event"), DEFAULT_AGE_GROUP);
    }

    #[test]
    fn test_age_group() {
        assert_eq!(extract_age_group("适合5-8岁"), "5-8");
        assert_eq!(extract_age_group("适合5到7岁的孩子"), "5-7");
        assert_eq!(extract_age_group("4岁"), "3-5");
        assert_eq!(extract_age_group("7岁"), "6-8");
        assert_eq!(extract_age_group("15岁"), "9-12");
        assert_eq!(extract_age_group("没有年龄"), "6-8");
        assert_eq!(extract_age_group("99999999999岁"), "9-12");
    }

    #[test]
    fn test_age_group_english() {
        assert_eq!(extract_age_group("for a 4 year old"), "3-5");
        assert_eq!(extract_age_group("kids 9 to 11 years"), "9-11");
        assert_eq!(extract_age_group("a 20 minute game for a 6 year old"), "6-8");
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(extract_difficulty("简单一点"), DifficultyLevel::Easy);
        assert_eq!(extract_difficulty("中等难度"), DifficultyLevel::Medium);
        assert_eq!(extract_difficulty("有挑战的"), DifficultyLevel::Hard);
        assert_eq!(extract_difficulty("难度递增"), DifficultyLevel::Hard);
        assert_eq!(extract_difficulty("自适应"), DifficultyLevel::Adaptive);
        assert_eq!(extract_difficulty("whatever"), DifficultyLevel::Easy);
        assert_eq!(extract_difficulty("An ADVANCED quiz"), DifficultyLevel::Hard);
    }

    #[test]
    fn test_theme() {
        assert_eq!(extract_theme("动物园"), "animals");
        assert_eq!(extract_theme("火箭发射"), "space");
        assert_eq!(extract_theme("公主城堡"), "fairy-tale");
        assert_eq!(extract_theme("海底世界"), "ocean");
        assert_eq!(extract_theme("侏罗纪"), "dinosaur");
        assert_eq!(extract_theme("超人"), "superhero");
        assert_eq!(extract_theme("普通的"), DEFAULT_THEME);
    }

    #[test]
    fn test_title() {
        assert_eq!(generate_title(GameType::Math, "space"), "太空数学冒险");
        assert_eq!(generate_title(GameType::Memory, "animals"), "小动物记忆大师");
        assert_eq!(generate_title(GameType::Universal, DEFAULT_THEME), "奇妙游戏世界");
    }

    #[test]
    fn test_timer_and_duration() {
        let intent = analyze("请生成一个20分钟的游戏");
        assert_eq!(intent.duration_minutes, 20);
        assert!(!intent.timer_enabled);

        let intent = analyze("需要计时");
        assert!(intent.timer_enabled);
        assert_eq!(intent.duration_minutes, DEFAULT_DURATION_MINUTES);

        assert!(analyze("a Timed quiz, 5 min").timer_enabled);
        assert_eq!(extract_duration("a timed quiz, 5 min"), 5);
        assert_eq!(extract_duration("99999999999分钟"), DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn test_analyze_is_total() {
        let intent = analyze("");
        assert_eq!(intent.game_type, GameType::Universal);
        assert_eq!(intent.age_group, DEFAULT_AGE_GROUP);
        assert_eq!(intent.difficulty, DifficultyLevel::Easy);
        assert_eq!(intent.theme, DEFAULT_THEME);
        assert_eq!(intent.title, "奇妙游戏世界");
        assert!(!intent.timer_enabled);
        assert_eq!(intent.duration_minutes, DEFAULT_DURATION_MINUTES);
    }
}
