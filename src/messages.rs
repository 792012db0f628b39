//! Localized bot message templates.
//!
//! Messages are MarkdownV2; interpolated values go through
//! [`markdown_escape`] so user-supplied names cannot break formatting.
//! Language selection is a closed enum with an explicit English fallback,
//! never open-ended string matching.

/// Supported message languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Es,
    Uk,
    Ru,
    PtBr,
}

impl Lang {
    /// Map a Telegram language tag to a supported language.
    ///
    /// Unknown or absent tags fall back to English.
    pub fn from_tag(tag: Option<&str>) -> Lang {
        match tag {
            Some("es") => Lang::Es,
            Some("uk") => Lang::Uk,
            Some("ru") => Lang::Ru,
            Some("pt-BR") | Some("pt-br") | Some("pt") => Lang::PtBr,
            _ => Lang::En,
        }
    }
}

/// Escape a string for MarkdownV2 text position.
pub fn markdown_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|'
                | '{' | '}' | '.' | '!' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn bold(text: &str) -> String {
    format!("*{}*", markdown_escape(text))
}

fn link(text: &str, url: &str) -> String {
    // Bot usernames and references are [A-Za-z0-9_-], so the URL needs no
    // escaping; the link text does.
    format!("[{}]({})", markdown_escape(text), url)
}

fn calendar_url(bot_name: &str) -> String {
    format!("https://t.me/{}/calendar", bot_name)
}

fn share_url(bot_name: &str, calendar_ref: &str) -> String {
    format!("https://t.me/{}/calendar?startapp={}", bot_name, calendar_ref)
}

/// Greeting sent in response to /start and /info.
pub fn greeting_message(lang: Lang, bot_name: &str) -> String {
    let app = bold("Group Meetup Facilitator");
    let url = calendar_url(bot_name);

    match lang {
        Lang::Es => format!(
            "{intro}\n{app} te ayuda a organizar reuniones grupales\\. Así funciona:\n\
             1\\. El organizador abre el {cal} para proponer fechas\n\
             2\\. El organizador recibe un enlace para compartir con el grupo\n\
             3\\. Los miembros del grupo votan por las fechas que les funcionan\n\
             4\\. El organizador elige la mejor opción\n\
             Ve al {cal2} para comenzar",
            intro = markdown_escape("¡Hola!"),
            app = app,
            cal = link("calendario", &url),
            cal2 = link("calendario", &url),
        ),
        Lang::Uk => format!(
            "{intro}\n{app} допомагає організовувати групові зустрічі\\. Ось як це працює:\n\
             1\\. Організатор відкриває {cal}, щоб запропонувати дати\n\
             2\\. Організатор отримує посилання для групи\n\
             3\\. Члени групи голосують за дати, які їм підходять\n\
             4\\. Організатор обирає найкращий варіант\n\
             Перейдіть до {cal2}, щоб почати",
            intro = markdown_escape("Вітаємо!"),
            app = app,
            cal = link("календар", &url),
            cal2 = link("календаря", &url),
        ),
        Lang::Ru => format!(
            "{intro}\n{app} помогает организовывать групповые встречи\\. Вот как это работает:\n\
             1\\. Организатор открывает {cal}, чтобы предложить даты\n\
             2\\. Организатор получает ссылку для группы\n\
             3\\. Члены группы голосуют за подходящие даты\n\
             4\\. Организатор выбирает лучший вариант\n\
             Перейдите в {cal2}, чтобы начать",
            intro = markdown_escape("Привет!"),
            app = app,
            cal = link("календарь", &url),
            cal2 = link("календарь", &url),
        ),
        Lang::PtBr => format!(
            "{intro}\n{app} ajuda você a organizar encontros em grupo\\. Veja como funciona:\n\
             1\\. O organizador abre o {cal} para propor datas\n\
             2\\. O organizador recebe um link para compartilhar com o grupo\n\
             3\\. Os membros do grupo votam nas datas que funcionam\n\
             4\\. O organizador escolhe a melhor opção\n\
             Vá para o {cal2} para começar",
            intro = markdown_escape("Olá!"),
            app = app,
            cal = link("calendário", &url),
            cal2 = link("calendário", &url),
        ),
        Lang::En => format!(
            "Hello\\!\n{app} helps you organize group meetups\\. Here's how it works:\n\
             1\\. Organizer opens {cal} to set options for when the group can meet\n\
             2\\. Organizer receives a link to share with the group\n\
             3\\. Group members vote for the options that work for them\n\
             4\\. Organizer picks the best option\n\
             Go to {cal2} to get started",
            app = app,
            cal = link("the calendar", &url),
            cal2 = link("the calendar", &url),
        ),
    }
}

/// Confirmation sent right after a calendar submission.
pub fn calendar_link_message(lang: Lang) -> String {
    match lang {
        Lang::Es => markdown_escape(
            "¡Gracias!\nTu calendario ha sido enviado y está listo para compartir. \
             Comparte el siguiente mensaje o simplemente copia el enlace de él.",
        ),
        Lang::Uk => markdown_escape(
            "Дякуємо!\nВаш календар надіслано і готовий до поширення. \
             Поділіться наступним повідомленням або просто скопіюйте посилання з нього.",
        ),
        Lang::Ru => markdown_escape(
            "Спасибо!\nВаш календарь отправлен и готов к распространению. \
             Поделитесь следующим сообщением или просто скопируйте ссылку из него.",
        ),
        Lang::PtBr => markdown_escape(
            "Obrigado!\nSeu calendário foi enviado e está pronto para ser compartilhado. \
             Compartilhe a próxima mensagem ou apenas copie o link dela.",
        ),
        Lang::En => markdown_escape(
            "Thanks!\nYour calendar is submitted and is ready to share. \
             Feel free to share the next message or just copy the link from it.",
        ),
    }
}

/// Shareable message embedding the public calendar link.
pub fn calendar_share_message(
    lang: Lang,
    user_name: &str,
    bot_name: &str,
    calendar_ref: &str,
) -> String {
    let name = markdown_escape(user_name);
    let app = bold("Group Meetup Facilitator");
    let url = share_url(bot_name, calendar_ref);
    let url_link = link(&url, &url);

    match lang {
        Lang::Es => format!(
            "{name} usa {app} para organizar una reunión grupal\\!\n\
             Haz clic en el enlace para votar por las fechas que te funcionan\\. \
             Puedes votar por varias fechas:\n{url_link}"
        ),
        Lang::Uk => format!(
            "{name} використовує {app} для організації групової зустрічі\\!\n\
             Натисніть на посилання, щоб проголосувати за дати, які вам підходять\\. \
             Можна голосувати за кілька дат:\n{url_link}"
        ),
        Lang::Ru => format!(
            "{name} использует {app} для организации групповой встречи\\!\n\
             Нажмите на ссылку, чтобы проголосовать за подходящие вам даты\\. \
             Можно голосовать за несколько дат:\n{url_link}"
        ),
        Lang::PtBr => format!(
            "{name} usa o {app} para organizar um encontro em grupo\\!\n\
             Clique no link para votar nas datas que funcionam para você\\. \
             Você pode votar em várias datas:\n{url_link}"
        ),
        Lang::En => format!(
            "{name} uses {app} to organize a group meetup\\!\n\
             Please click on the link below to vote for the dates that work for you\\. \
             You can vote for multiple dates:\n{url_link}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_tag() {
        assert_eq!(Lang::from_tag(Some("es")), Lang::Es);
        assert_eq!(Lang::from_tag(Some("uk")), Lang::Uk);
        assert_eq!(Lang::from_tag(Some("ru")), Lang::Ru);
        assert_eq!(Lang::from_tag(Some("pt-BR")), Lang::PtBr);
        assert_eq!(Lang::from_tag(Some("pt-br")), Lang::PtBr);
        // Unknown tags and absence fall back to English
        assert_eq!(Lang::from_tag(Some("de")), Lang::En);
        assert_eq!(Lang::from_tag(Some("")), Lang::En);
        assert_eq!(Lang::from_tag(None), Lang::En);
    }

    #[test]
    fn test_markdown_escape() {
        assert_eq!(markdown_escape("a.b!c"), "a\\.b\\!c");
        assert_eq!(markdown_escape("no specials"), "no specials");
        assert_eq!(markdown_escape("a_b*c[d]"), "a\\_b\\*c\\[d\\]");
        assert_eq!(markdown_escape("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_greeting_contains_calendar_link() {
        let msg = greeting_message(Lang::En, "test_bot");
        assert!(msg.contains("https://t.me/test_bot/calendar"));
        assert!(msg.contains("*Group Meetup Facilitator*"));
    }

    #[test]
    fn test_greeting_localized() {
        for lang in [Lang::En, Lang::Es, Lang::Uk, Lang::Ru, Lang::PtBr] {
            let msg = greeting_message(lang, "test_bot");
            assert!(msg.contains("https://t.me/test_bot/calendar"));
        }
        assert_ne!(
            greeting_message(Lang::En, "b"),
            greeting_message(Lang::Uk, "b")
        );
    }

    #[test]
    fn test_share_message_embeds_reference() {
        let msg = calendar_share_message(Lang::En, "Ann", "test_bot", "Ab3dE_f9");
        assert!(msg.contains("https://t.me/test_bot/calendar?startapp=Ab3dE_f9"));
        assert!(msg.contains("Ann"));
    }

    #[test]
    fn test_share_message_escapes_user_name() {
        // A markdown-significant name must arrive escaped
        let msg = calendar_share_message(Lang::En, "A.B!", "test_bot", "ref12345");
        assert!(msg.contains("A\\.B\\!"));
    }
}
