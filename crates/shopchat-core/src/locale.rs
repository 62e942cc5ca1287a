/// Fixed texts the widget shows on its own behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    pub greeting: &'static str,
    pub generic_error: &'static str,
    pub connect_error: &'static str,
    pub title: &'static str,
    pub toggle_label: &'static str,
    pub input_hint: &'static str,
    pub user_label: &'static str,
    pub assistant_label: &'static str,
}

const POLISH: Strings = Strings {
    greeting: "Cześć! 👋 Jestem asystentem sklepu. Jak mogę Ci pomóc?",
    generic_error: "Przepraszam, wystąpił błąd. Spróbuj ponownie.",
    connect_error: "Przepraszam, nie mogę się połączyć z serwerem.",
    title: "Asystent sklepu",
    toggle_label: "💬 Czat",
    input_hint: "Napisz wiadomość...",
    user_label: "Ty",
    assistant_label: "Asystent",
};

const ENGLISH: Strings = Strings {
    greeting: "Hi! 👋 I'm the shop assistant. How can I help you?",
    generic_error: "Sorry, an error occurred. Please try again.",
    connect_error: "Sorry, I cannot connect to the server.",
    title: "Shop assistant",
    toggle_label: "💬 Chat",
    input_hint: "Type a message...",
    user_label: "You",
    assistant_label: "Assistant",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Polish,
    English,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Polish => "pl",
            Locale::English => "en",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pl" | "polish" | "polski" => Some(Locale::Polish),
            "en" | "english" => Some(Locale::English),
            _ => None,
        }
    }

    pub fn all() -> Vec<Locale> {
        vec![Locale::Polish, Locale::English]
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Locale::Polish => &POLISH,
            Locale::English => &ENGLISH,
        }
    }
}
