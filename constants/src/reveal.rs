/// Observer threshold, root margin and CSS transition per reveal kind.
pub struct RevealTierSettings {
    pub threshold: f64,
    pub root_margin: &'static str,
    pub transition: &'static str,
    pub selector: &'static str,
}

pub const FADE_TIER: RevealTierSettings = RevealTierSettings {
    threshold: 0.1,
    root_margin: "0px 0px -50px 0px",
    transition: "all 0.8s cubic-bezier(0.4, 0, 0.2, 1)",
    selector: ".feature-card, .agent-card, .contact-form, .section-header",
};

pub const SLIDE_TIER: RevealTierSettings = RevealTierSettings {
    threshold: 0.2,
    root_margin: "0px 0px -30px 0px",
    transition: "all 0.6s cubic-bezier(0.175, 0.885, 0.32, 1.275)",
    selector: ".hero-stats .stat-item, .demo-controls .control-group",
};

pub const SCALE_TIER: RevealTierSettings = RevealTierSettings {
    threshold: 0.3,
    root_margin: "0px",
    transition: "all 0.5s cubic-bezier(0.68, -0.55, 0.265, 1.55)",
    selector: ".agent-icon, .feature-icon, .btn",
};

/// Stagger between consecutive slide targets, seconds.
pub const SLIDE_STAGGER_SECS: f32 = 0.1;

pub const SPARKLE_COUNT: usize = 5;
pub const SPARKLE_LIFETIME_SECS: f32 = 2.0;
pub const SPARKLE_CLASS: &str = "sparkle-effect";
pub const SPARKLE_KEYFRAMES_ID: &str = "sparkle-keyframes";

pub const SLIDE_GLOW: &str = "0 4px 20px rgba(0, 255, 255, 0.15)";
pub const SLIDE_GLOW_SECS: f32 = 1.0;

pub const REDUCED_MOTION_STYLE_ID: &str = "reduced-motion-override";
pub const PROGRESS_BAR_ID: &str = "scroll-progress";

/// Section effect selectors.
pub const PARALLAX_SELECTOR: &str = ".floating-elements .float-element";
pub const SECTION_SELECTOR: &str = "section";
pub const HERO_TITLE_SELECTOR: &str = ".hero-title";
pub const HERO_SUBTITLE_SELECTOR: &str = ".hero-subtitle";
pub const AGENT_CARD_SELECTOR: &str = ".agent-card";
pub const FEATURE_CARD_SELECTOR: &str = ".feature-card";
pub const DEMO_SCREEN_SELECTOR: &str = ".demo-screen";

/// Stagger between agent cards as a fraction of section visibility.
pub const CARD_STAGGER: f32 = 0.1;
