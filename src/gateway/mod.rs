//! Chat-facing side of the relay: command handling plus the transports that
//! deliver messages to and from users.

pub mod http;
pub mod telegram;

use crate::recommender::{RecommendationService, ReplyText};
use tokio_util::sync::CancellationToken;
use tracing::info;

const HELP_TEXT: &str = "📖 Como usar o bot de filmes\n\n\
Basta escrever em linguagem natural o tipo de filme que você quer.\n\n\
Exemplos:\n \
- 'filme de comédia de 2010 pra cima'\n \
- 'drama bem pesado sobre guerra'\n \
- 'animação divertida pra ver com crianças'\n \
- 'algo parecido com Interestelar'\n\n\
Eu vou usar a IA para sugerir alguns filmes que combinem com o seu pedido.";

const START_BODY: &str = "Eu sou um bot que recomenda filmes usando um modelo de IA (LLaMA).\n\
Me conte o que você quer assistir, por exemplo:\n\n \
- 'Quero uma comédia romântica leve'\n \
- 'Filme de terror psicológico dos anos 80'\n \
- 'Um musical sobre circo'\n \
- 'Filme de ação com clima mais sério'\n\n\
E eu te sugiro alguns títulos 🙂";

const UNKNOWN_COMMAND_TEXT: &str =
    "Não conheço esse comando. Manda /help para ver como me usar, ou só me conta que filme você quer ver.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Unknown(String),
}

impl Command {
    /// Parses `/name` and `/name@botname`, ignoring any arguments.
    /// Returns `None` for plain text.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('/')?;
        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        let command = match name.to_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Bot named after `@` in a command such as `/help@cinebot`. `None` for plain
/// text and for commands without an explicit addressee.
pub fn command_addressee(text: &str) -> Option<&str> {
    let rest = text.trim_start().strip_prefix('/')?;
    let word = rest.split_whitespace().next()?;
    word.split_once('@')
        .map(|(_, bot)| bot)
        .filter(|bot| !bot.is_empty())
}

/// Routes inbound chat text: fixed commands are answered here, everything
/// else goes through the recommendation pipeline.
#[derive(Clone)]
pub struct ChatGateway {
    recommender: RecommendationService,
}

impl ChatGateway {
    pub fn new(recommender: RecommendationService) -> Self {
        Self { recommender }
    }

    pub async fn handle(
        &self,
        conversation_id: &str,
        first_name: Option<&str>,
        text: &str,
        cancel: &CancellationToken,
    ) -> ReplyText {
        match Command::parse(text) {
            Some(Command::Start) => ReplyText::new(start_text(first_name)),
            Some(Command::Help) => ReplyText::new(HELP_TEXT),
            Some(Command::Unknown(name)) => {
                info!(conversation_id, "Unknown command: /{}", name);
                ReplyText::new(UNKNOWN_COMMAND_TEXT)
            }
            None => self.on_text_message(conversation_id, text, cancel).await,
        }
    }

    pub async fn on_text_message(
        &self,
        conversation_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> ReplyText {
        info!(conversation_id, "User message: {}", text);
        self.recommender.produce_with_cancel(text, cancel).await
    }
}

fn start_text(first_name: Option<&str>) -> String {
    match first_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("Olá, {}! 🍿\n\n{}", name, START_BODY),
        None => format!("Olá! 🍿\n\n{}", START_BODY),
    }
}
