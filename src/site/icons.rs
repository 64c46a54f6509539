use serde::Serialize;

/// Icons the site templates may ask for. Unknown names resolve to
/// [`IconId::Circle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconId {
    Home,
    Calculator,
    Percent,
    Key,
    Shield,
    ChartLine,
    Phone,
    Mail,
    MapPin,
    Users,
    Briefcase,
    FileText,
    Check,
    Globe,
    Circle,
}

/// Normalized name → icon. Names are compared lowercased with `-`, `_` and
/// spaces removed.
const ICON_TABLE: &[(&str, IconId)] = &[
    ("home", IconId::Home),
    ("house", IconId::Home),
    ("calculator", IconId::Calculator),
    ("calc", IconId::Calculator),
    ("percent", IconId::Percent),
    ("rate", IconId::Percent),
    ("key", IconId::Key),
    ("shield", IconId::Shield),
    ("insurance", IconId::Shield),
    ("chartline", IconId::ChartLine),
    ("chart", IconId::ChartLine),
    ("trend", IconId::ChartLine),
    ("phone", IconId::Phone),
    ("mail", IconId::Mail),
    ("email", IconId::Mail),
    ("mappin", IconId::MapPin),
    ("location", IconId::MapPin),
    ("users", IconId::Users),
    ("team", IconId::Users),
    ("briefcase", IconId::Briefcase),
    ("filetext", IconId::FileText),
    ("document", IconId::FileText),
    ("check", IconId::Check),
    ("globe", IconId::Globe),
    ("circle", IconId::Circle),
];

impl IconId {
    pub const fn as_str(self) -> &'static str {
        match self {
            IconId::Home => "home",
            IconId::Calculator => "calculator",
            IconId::Percent => "percent",
            IconId::Key => "key",
            IconId::Shield => "shield",
            IconId::ChartLine => "chart-line",
            IconId::Phone => "phone",
            IconId::Mail => "mail",
            IconId::MapPin => "map-pin",
            IconId::Users => "users",
            IconId::Briefcase => "briefcase",
            IconId::FileText => "file-text",
            IconId::Check => "check",
            IconId::Globe => "globe",
            IconId::Circle => "circle",
        }
    }

    /// Exact lookup; `None` when the name is not in the table.
    pub fn lookup(name: &str) -> Option<IconId> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        ICON_TABLE.iter().find(|(n, _)| *n == key).map(|(_, id)| *id)
    }

    pub fn resolve(name: &str) -> IconId {
        Self::lookup(name).unwrap_or(IconId::Circle)
    }
}
