//! Static text tables used to build ticket descriptions.
//!
//! Templates reference tokens in braces: `{component}`, `{action}`,
//! `{userType}` and `{feature}`.

use super::Category;

pub(crate) const BUG_TEMPLATES: &[&str] = &[
    "the {component} stops responding during {action}",
    "{component} crashes the app on {action}",
    "{component} slows down badly during {action}",
];

pub(crate) const FEATURE_TEMPLATES: &[&str] = &[
    "add support for {action} in the {component}",
    "let {userType} handle {action} themselves",
    "improve {feature} to speed up {action}",
];

pub(crate) const TECHNICAL_TEMPLATES: &[&str] = &[
    "upgrade the {component} so it can handle {action}",
    "technical cleanup: make {action} faster in the {component}",
    "restructure the {component} around {action}",
];

pub(crate) const SUPPORT_TEMPLATES: &[&str] = &[
    "{userType} are unable to {action}",
    "help requested to {action} the {component}",
    "a user guide is needed for {feature}",
];

pub(crate) const COMPONENTS: &[&str] = &[
    "header",
    "footer",
    "button",
    "form",
    "list",
    "table",
    "chart",
    "menu",
    "side panel",
    "modal",
    "contact page",
];

pub(crate) const BUG_ACTIONS: &[&str] = &[
    "opening",
    "closing",
    "validation",
    "submission",
    "deletion",
];

pub(crate) const FEATURE_ACTIONS: &[&str] = &[
    "adding items",
    "removing items",
    "editing",
    "customization",
    "layout adaptation",
];

pub(crate) const TECHNICAL_ACTIONS: &[&str] = &[
    "sorting",
    "filtering",
    "search",
    "caching",
    "third-party integration",
];

pub(crate) const SUPPORT_ACTIONS: &[&str] = &[
    "configure",
    "troubleshoot",
    "train staff on",
    "assist with",
    "debug",
];

pub(crate) const USER_TYPES: &[&str] = &[
    "users",
    "customers",
    "administrators",
    "moderators",
    "visitors",
    "subscribers",
];

pub(crate) const FEATURES: &[&str] = &[
    "the interface",
    "the user experience",
    "performance",
    "security",
    "stability",
    "accessibility",
    "the documentation",
];

/// Description templates for a category.
pub(crate) fn templates_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Bug => BUG_TEMPLATES,
        Category::Feature => FEATURE_TEMPLATES,
        Category::Technical => TECHNICAL_TEMPLATES,
        Category::Support => SUPPORT_TEMPLATES,
    }
}

/// Candidates for the `{action}` token, which depend on the category.
pub(crate) fn actions_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Bug => BUG_ACTIONS,
        Category::Feature => FEATURE_ACTIONS,
        Category::Technical => TECHNICAL_ACTIONS,
        Category::Support => SUPPORT_ACTIONS,
    }
}

/// Candidates for a template token, or `None` if the token is unknown.
pub(crate) fn candidates_for(token: &str, category: Category) -> Option<&'static [&'static str]> {
    match token {
        "component" => Some(COMPONENTS),
        "action" => Some(actions_for(category)),
        "userType" => Some(USER_TYPES),
        "feature" => Some(FEATURES),
        _ => None,
    }
}
