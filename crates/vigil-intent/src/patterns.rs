//! Deterministic pattern tier.
//!
//! Keyword scoring for the category, regex cascades for the service name and
//! timeframe. All matching happens on a lowercased copy of the query, so the
//! patterns themselves are written lowercase.

use std::sync::LazyLock;

use regex::Regex;

use vigil_core::{IntentCategory, Timeframe};

// =============================================================================
// Category keywords
// =============================================================================

/// Keyword lists per category, in tie-break precedence order.
static CATEGORY_KEYWORDS: &[(IntentCategory, &[&str])] = &[
    (
        IntentCategory::CheckHealth,
        &[
            "check",
            "status",
            "health",
            "issue",
            "problem",
            "error",
            "alert",
            "wrong",
            "failing",
            "down",
            "broken",
            "not working",
            "abnormal",
            "anomaly",
            "investigate",
            "look into",
            "whats up with",
            "how is",
            "how are",
            "happening with",
            "going on",
        ],
    ),
    (
        IntentCategory::ListServices,
        &[
            "list",
            "show all",
            "show me",
            "get all",
            "what services",
            "available services",
            "which services",
            "all services",
            "what do we have",
            "what applications",
            "show services",
        ],
    ),
    (
        IntentCategory::ServiceDetails,
        &[
            "details about",
            "info about",
            "information on",
            "tell me about",
            "what is",
            "describe",
            "explain",
            "more about",
        ],
    ),
    (
        IntentCategory::MetricsAnalysis,
        &[
            "metrics",
            "performance",
            "stats",
            "statistics",
            "kpi",
            "how fast",
            "response time",
            "latency",
            "throughput",
            "cpu",
            "memory",
            "disk",
            "analyze",
            "analysis",
        ],
    ),
    (
        IntentCategory::CompareServices,
        &[
            "compare",
            "comparison",
            "versus",
            "vs",
            "difference between",
            "which is better",
            "against",
            "relative to",
        ],
    ),
    (
        IntentCategory::Troubleshoot,
        &[
            "troubleshoot",
            "diagnose",
            "debug",
            "fix",
            "solve",
            "why is",
            "root cause",
            "reason for",
            "causing",
            "slow",
            "help with",
            "figure out",
        ],
    ),
];

/// Score each category by keyword occurrences and return the best one.
///
/// Ties resolve to the earlier entry in precedence order (strict `>` while
/// scanning). An all-zero score means the query matched nothing we know, so
/// it falls out as [`IntentCategory::GeneralQuestion`].
pub fn detect_category(text: &str) -> IntentCategory {
    let mut best: Option<(IntentCategory, usize)> = None;
    for (category, keywords) in CATEGORY_KEYWORDS {
        let score = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if score > 0 && best.map_or(true, |(_, s)| score > s) {
            best = Some((*category, score));
        }
    }
    best.map_or(IntentCategory::GeneralQuestion, |(c, _)| c)
}

// =============================================================================
// Service-name extraction
// =============================================================================

struct ServicePatterns {
    after_for: Regex,
    after_of_about: Regex,
    after_service: Regex,
    before_service: Regex,
    quoted: Regex,
    suffixed: Regex,
    prefixed: Regex,
    after_action: Vec<Regex>,
}

static SERVICE_PATTERNS: LazyLock<ServicePatterns> = LazyLock::new(|| {
    let mk = |p: &str| Regex::new(p).expect("Invalid service regex");

    // Action verbs that commonly precede a bare service name.
    let actions = [
        "check", "analyze", "monitor", "debug", "fix", "look", "see", "show",
    ];

    ServicePatterns {
        after_for: mk(r"\bfor[:\s]+([a-z0-9\-_.]+)"),
        after_of_about: mk(r"\b(?:of|about)[:\s]+([a-z0-9\-_.]+)"),
        after_service: mk(r"\bservice[:\s]+([a-z0-9\-_.]+)"),
        before_service: mk(r"([a-z0-9\-_.]+)\s+service\b"),
        quoted: mk(r#"["']([a-z0-9\-_.]+)["']"#),
        suffixed: mk(r"\b([a-z0-9\-_]+(?:api|service|controller|backend|frontend|gateway|proxy))\b"),
        prefixed: mk(r"\b(?:api|service|controller)[-_]([a-z0-9\-_]+)\b"),
        after_action: actions
            .iter()
            .map(|a| mk(&format!(r"\b{a}\s+(?:the\s+)?([a-z0-9\-_.]+)\b")))
            .collect(),
    }
});

/// Generic words that can follow an action verb but are never service names.
const STOPLIST: &[&str] = &["service", "services", "status", "health", "metrics", "issues"];

/// Extract a service name from lowercased query text.
///
/// Cascades through progressively weaker patterns; the first hit wins.
pub fn extract_service_name(text: &str) -> Option<String> {
    let p = &*SERVICE_PATTERNS;

    for re in [&p.after_for, &p.after_of_about, &p.after_service, &p.before_service, &p.quoted] {
        if let Some(caps) = re.captures(text) {
            return Some(caps[1].to_string());
        }
    }

    if let Some(caps) = p.suffixed.captures(text) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = p.prefixed.captures(text) {
        return Some(caps[1].to_string());
    }

    for re in &p.after_action {
        if let Some(caps) = re.captures(text) {
            let candidate = &caps[1];
            if !STOPLIST.contains(&candidate) {
                return Some(candidate.to_string());
            }
        }
    }

    None
}

// =============================================================================
// Timeframe extraction
// =============================================================================

struct TimePatterns {
    canonical: Regex,
    relative: Regex,
}

static TIME_PATTERNS: LazyLock<TimePatterns> = LazyLock::new(|| TimePatterns {
    canonical: Regex::new(r"\b([0-9]+)\s*([mhdw])\b").expect("Invalid timeframe regex"),
    relative: Regex::new(
        r"\b(?:last|past|previous|recent)\s+([0-9]+)\s*(minute|hour|day|week)s?\b",
    )
    .expect("Invalid timeframe regex"),
});

/// Colloquial time words mapped to canonical windows.
static TIME_KEYWORDS: &[(&str, &str)] = &[
    ("today", "24h"),
    ("yesterday", "48h"),
    ("this week", "7d"),
    ("this month", "30d"),
    ("recently", "2h"),
    ("recent", "2h"),
];

/// Extract a time window from lowercased query text.
///
/// Returns `None` when the query says nothing about time, so that context
/// carry-over can distinguish "no window given" from an explicit "2h".
pub fn extract_timeframe(text: &str) -> Option<Timeframe> {
    let p = &*TIME_PATTERNS;

    if let Some(caps) = p.canonical.captures(text) {
        if let Ok(tf) = format!("{}{}", &caps[1], &caps[2]).parse() {
            return Some(tf);
        }
    }

    if let Some(caps) = p.relative.captures(text) {
        let unit = caps[2].chars().next()?;
        if let Ok(tf) = format!("{}{}", &caps[1], unit).parse() {
            return Some(tf);
        }
    }

    // "recently" is checked before "recent" so the longer word wins.
    for (keyword, canonical) in TIME_KEYWORDS {
        if text.contains(keyword) {
            return canonical.parse().ok();
        }
    }

    None
}
