//! Release names as they come out of acquisition tools and fansub groups.

use anidrop_parser::{parse, ParsedRelease};

struct Case {
    input: &'static str,
    title: &'static str,
    season: Option<u32>,
    episode: Option<u32>,
    resolution: Option<&'static str>,
    group: Option<&'static str>,
}

const CASES: &[Case] = &[
    Case {
        input: "[SubsPlease] Jujutsu Kaisen - 24 (1080p) [ABCD1234].mkv",
        title: "Jujutsu Kaisen",
        season: None,
        episode: Some(24),
        resolution: Some("1080p"),
        group: Some("SubsPlease"),
    },
    Case {
        input: "[Judas] Chainsaw Man - S01E12 [1080p][HEVC x265 10bit][Dual-Audio].mkv",
        title: "Chainsaw Man",
        season: Some(1),
        episode: Some(12),
        resolution: Some("1080p"),
        group: Some("Judas"),
    },
    Case {
        input: "[Erai-raws] Spy x Family - 25 [1080p][Multiple Subtitle].mkv",
        title: "Spy x Family",
        season: None,
        episode: Some(25),
        resolution: Some("1080p"),
        group: Some("Erai-raws"),
    },
    Case {
        input: "[SubGroup] Attack on Titan - The Final Season - 28 [1080p] [ENG].mkv",
        title: "Attack on Titan - The Final Season",
        season: None,
        episode: Some(28),
        resolution: Some("1080p"),
        group: Some("SubGroup"),
    },
    Case {
        input: "Show Title S02E03 [720p].mkv",
        title: "Show Title",
        season: Some(2),
        episode: Some(3),
        resolution: Some("720p"),
        group: None,
    },
    Case {
        input: "Mushoku Tensei 2nd Season - 05 [1080p].mkv",
        title: "Mushoku Tensei",
        season: Some(2),
        episode: Some(5),
        resolution: Some("1080p"),
        group: None,
    },
    Case {
        input: "Oshi no Ko Season 2 Episode 7.mp4",
        title: "Oshi no Ko",
        season: Some(2),
        episode: Some(7),
        resolution: None,
        group: None,
    },
    Case {
        input: "Kaguya-sama wa Kokurasetai! - 05v2 (1920x1080).mkv",
        title: "Kaguya-sama wa Kokurasetai!",
        season: None,
        episode: Some(5),
        resolution: Some("1080p"),
        group: None,
    },
    Case {
        input: "Dungeon.Meshi.S01E10.1080p.WEB.H264.mkv",
        title: "Dungeon Meshi",
        season: Some(1),
        episode: Some(10),
        resolution: Some("1080p"),
        group: None,
    },
    Case {
        input: "Re:Zero kara Hajimeru Isekai Seikatsu: Part 2 - 11 [1080p].mkv",
        title: "Re:Zero kara Hajimeru Isekai Seikatsu: Part 2",
        season: None,
        episode: Some(11),
        resolution: Some("1080p"),
        group: None,
    },
    Case {
        input: "show s01e01.mkv",
        title: "show",
        season: Some(1),
        episode: Some(1),
        resolution: None,
        group: None,
    },
];

#[test]
fn test_fixtures() {
    let mut failures = Vec::new();

    for case in CASES {
        let release = parse(case.input);
        let expected = ParsedRelease {
            title: case.title.to_string(),
            season: case.season,
            episode: case.episode,
            resolution: case.resolution.map(String::from),
            group: case.group.map(String::from),
            extension: release.extension.clone(),
        };

        if release != expected {
            failures.push(format!(
                "{}\n  expected: {:?}\n  actual:   {:?}",
                case.input, expected, release
            ));
        }
    }

    assert!(failures.is_empty(), "{} failures:\n{}", failures.len(), failures.join("\n"));
}

#[test]
fn test_missing_numbering() {
    let release = parse("Made in Abyss [1080p].mkv");
    assert_eq!(release.title, "Made in Abyss");
    assert_eq!(release.season, None);
    assert_eq!(release.episode, None);
}

#[test]
fn test_no_title() {
    let release = parse("[Group] [1080p].mkv");
    assert!(!release.has_title());
    assert_eq!(release.group.as_deref(), Some("Group"));
}

#[test]
fn test_underscored_name() {
    let release = parse("[Group]_Bocchi_the_Rock_-_08_[1080p].mkv");
    assert_eq!(release.title, "Bocchi the Rock");
    assert_eq!(release.episode, Some(8));
}
