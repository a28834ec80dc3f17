//! Reads what an open port says about itself.
//!
//! Service names come from a well-known port table. Product, version and OS
//! hints are pulled out of the first bytes a service sends (or answers to a
//! minimal HTTP request).

use vigil_common::inventory::OsFact;

/// Sent to ports that stay quiet until spoken to.
pub const HTTP_REQUEST: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Accuracy of an OS named outright in a banner.
const BANNER_OS_ACCURACY: u8 = 85;

const SERVICES: &[(u16, &str)] = &[
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "domain"),
    (80, "http"),
    (110, "pop3"),
    (135, "msrpc"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (548, "afp"),
    (631, "ipp"),
    (993, "imaps"),
    (995, "pop3s"),
    (1883, "mqtt"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (5432, "postgresql"),
    (5900, "vnc"),
    (8000, "http-alt"),
    (8080, "http-proxy"),
    (8443, "https-alt"),
    (9100, "jetdirect"),
];

/// Plain-text HTTP ports worth a `HEAD` request.
const HTTP_PORTS: &[u16] = &[80, 631, 8000, 8080];

/// Products recognised in free-form greeting lines (FTP, SMTP, POP, IMAP).
const GREETING_PRODUCTS: &[&str] = &[
    "vsFTPd",
    "ProFTPD",
    "Pure-FTPd",
    "FileZilla",
    "Postfix",
    "Exim",
    "Sendmail",
    "Dovecot",
    "Courier",
    "MySQL",
];

/// Keyword, OS name, OS family.
const OS_KEYWORDS: &[(&str, &str, &str)] = &[
    ("ubuntu", "Linux (Ubuntu)", "Linux"),
    ("debian", "Linux (Debian)", "Linux"),
    ("raspbian", "Linux (Raspbian)", "Linux"),
    ("centos", "Linux (CentOS)", "Linux"),
    ("red hat", "Linux (Red Hat)", "Linux"),
    ("fedora", "Linux (Fedora)", "Linux"),
    ("alpine", "Linux (Alpine)", "Linux"),
    ("freebsd", "FreeBSD", "BSD"),
    ("openbsd", "OpenBSD", "BSD"),
    ("microsoft", "Windows", "Windows"),
    ("windows", "Windows", "Windows"),
    ("win64", "Windows", "Windows"),
    ("win32", "Windows", "Windows"),
    ("darwin", "macOS", "macOS"),
];

pub fn service_name(port: u16) -> &'static str {
    SERVICES
        .iter()
        .find(|(p, _)| *p == port)
        .map_or("unknown", |(_, name)| *name)
}

pub fn wants_http_request(port: u16) -> bool {
    HTTP_PORTS.contains(&port)
}

/// What a banner gave away.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Identity {
    pub product: String,
    pub version: String,
    pub os: Option<OsFact>,
}

pub fn identify(banner: &str) -> Identity {
    let banner = banner.trim();
    let mut identity = if let Some(rest) = banner.strip_prefix("SSH-") {
        ssh_identity(rest)
    } else if banner.starts_with("HTTP/") {
        http_identity(banner)
    } else {
        greeting_identity(banner)
    };
    if identity.os.is_none() {
        identity.os = os_from_text(banner);
    }
    identity
}

/// `2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13`
fn ssh_identity(rest: &str) -> Identity {
    let software = rest
        .split_once('-')
        .map_or(rest, |(_, software)| software)
        .split_whitespace()
        .next()
        .unwrap_or_default();

    let (product, version) = software.rsplit_once('_').unwrap_or((software, ""));
    Identity {
        product: product.to_string(),
        version: version.to_string(),
        os: None,
    }
}

/// Looks for `Server: product/version (comment)`.
fn http_identity(response: &str) -> Identity {
    let Some(server) = response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case("server")
            .then(|| value.trim())
    }) else {
        return Identity::default();
    };

    let software = server.split_whitespace().next().unwrap_or_default();
    let (product, version) = software.split_once('/').unwrap_or((software, ""));
    Identity {
        product: product.to_string(),
        version: version.to_string(),
        os: os_from_text(server),
    }
}

/// `220 ftp.lan (vsFTPd 3.0.5)` or `220 mail ESMTP Postfix (Debian)`
fn greeting_identity(greeting: &str) -> Identity {
    let tokens: Vec<&str> = greeting
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|t| !t.is_empty())
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        if let Some(known) = GREETING_PRODUCTS
            .iter()
            .find(|p| p.eq_ignore_ascii_case(token))
        {
            let version = tokens
                .get(i + 1)
                .filter(|next| next.starts_with(|c: char| c.is_ascii_digit()))
                .copied()
                .unwrap_or_default();
            return Identity {
                product: known.to_string(),
                version: version.to_string(),
                os: None,
            };
        }
    }
    Identity::default()
}

fn os_from_text(text: &str) -> Option<OsFact> {
    let lowered = text.to_ascii_lowercase();
    OS_KEYWORDS
        .iter()
        .find(|(keyword, _, _)| lowered.contains(keyword))
        .map(|(_, name, family)| OsFact::new(*name, BANNER_OS_ACCURACY, *family))
}

/// Weak OS guesses from which ports are open at all.
pub fn port_profile_hints(open: &[u16]) -> Vec<OsFact> {
    let has = |port: u16| open.contains(&port);
    let mut hints = Vec::new();

    if has(135) && has(445) {
        hints.push(OsFact::new("Windows", 70, "Windows"));
    } else if has(3389) {
        hints.push(OsFact::new("Windows", 60, "Windows"));
    }
    if has(548) {
        hints.push(OsFact::new("macOS", 55, "macOS"));
    }
    if has(9100) && has(631) {
        hints.push(OsFact::new("Printer firmware", 50, "Embedded"));
    }
    hints
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
