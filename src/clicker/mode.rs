//! Page mode detection from the document title.

use serde::{Deserialize, Serialize};

/// Operating mode of one run, detected once from the page title and immutable
/// afterwards. Each mode carries the trigger count the page is expected to
/// show and the trigger indices the sequence must not click.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    Default,
    Mode1Or2,
    Mode3,
    Mode4,
}

impl PageMode {
    /// Detect the mode from a page title. Ordered substring match, first match
    /// wins; anything unrecognized (including an empty title) is `Default`.
    pub fn detect(title: &str) -> Self {
        if title.contains("模式1") || title.contains("模式2") {
            PageMode::Mode1Or2
        } else if title.contains("模式3") {
            PageMode::Mode3
        } else if title.contains("模式4") {
            PageMode::Mode4
        } else {
            PageMode::Default
        }
    }

    /// Trigger elements the page is expected to present in this mode.
    pub fn expected_trigger_count(&self) -> usize {
        match self {
            PageMode::Default => 0,
            PageMode::Mode1Or2 => 5,
            PageMode::Mode3 => 8,
            PageMode::Mode4 => 7,
        }
    }

    /// 0-based trigger indices excluded from processing.
    pub fn skip_indices(&self) -> &'static [usize] {
        match self {
            PageMode::Default | PageMode::Mode1Or2 => &[],
            PageMode::Mode3 => &[7],
            PageMode::Mode4 => &[6],
        }
    }
}

impl std::fmt::Display for PageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PageMode::Default => "default",
            PageMode::Mode1Or2 => "mode1or2",
            PageMode::Mode3 => "mode3",
            PageMode::Mode4 => "mode4",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode3() {
        let mode = PageMode::detect("测试模式3页面");
        assert_eq!(mode, PageMode::Mode3);
        assert_eq!(mode.expected_trigger_count(), 8);
        assert_eq!(mode.skip_indices(), &[7]);
    }

    #[test]
    fn test_detect_mode4() {
        let mode = PageMode::detect("某某模式4");
        assert_eq!(mode, PageMode::Mode4);
        assert_eq!(mode.expected_trigger_count(), 7);
        assert_eq!(mode.skip_indices(), &[6]);
    }

    #[test]
    fn test_detect_mode1_and_mode2_share_profile() {
        for title in ["模式1页面", "页面模式2"] {
            let mode = PageMode::detect(title);
            assert_eq!(mode, PageMode::Mode1Or2);
            assert_eq!(mode.expected_trigger_count(), 5);
            assert!(mode.skip_indices().is_empty());
        }
    }

    #[test]
    fn test_detect_first_match_wins() {
        // A title naming several markers resolves to the 1/2 branch first.
        assert_eq!(PageMode::detect("模式3和模式1"), PageMode::Mode1Or2);
    }

    #[test]
    fn test_detect_default() {
        assert_eq!(PageMode::detect(""), PageMode::Default);
        assert_eq!(PageMode::detect("plain page"), PageMode::Default);
        assert_eq!(PageMode::detect("模式5"), PageMode::Default);
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        let json = serde_json::to_string(&PageMode::Mode1Or2).unwrap();
        assert_eq!(json, "\"mode1or2\"");
        assert_eq!(PageMode::Mode3.to_string(), "mode3");
    }
}
