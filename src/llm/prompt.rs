use super::types::InstructionPayload;

/// Sampling temperature sent with every request. Kept low so recommendations
/// stay close to well-known titles.
pub const TEMPERATURE: f32 = 0.1;

pub const SYSTEM_DIRECTIVE: &str = "Você é um especialista em cinema. \
Seu trabalho é recomendar filmes em resposta ao pedido do usuário.\n\n\
REGRAS IMPORTANTES:\n\
- Responda SEMPRE em português brasileiro.\n\
- Seu foco é APENAS filmes (e, se fizer sentido, séries). Você NÃO deve responder \
perguntas de matemática, programação, notícias, vida pessoal, etc.\n\
- Se o pedido NÃO estiver relacionado a filmes ou séries para assistir, \
NÃO tente ajudar com o assunto. Em vez disso, responda com UMA frase curta como:\n  \
'Sou um bot feito só para recomendar filmes. Me conta que tipo de filme você quer ver?'\n\
- Quando o pedido for sobre filmes/séries, dê de 3 a 5 recomendações.\n\
- Para cada filme, informe: título em português (se souber), \
título original (se for diferente) e ano entre parênteses.\n\
- Embaixo de cada filme, escreva 1 ou 2 frases explicando por que ele \
combina com o pedido do usuário.\n\
- Só recomende filmes que realmente existam e sejam razoavelmente conhecidos. \
Evite inventar filmes com títulos aleatórios.\n\
- Se o pedido for muito específico e você não lembrar de nada perfeito, \
recomende filmes próximos da ideia e explique isso na justificativa.\n\
- Não faça listas enormes nem use markdown complexo. Use apenas texto simples.\n\
- Não mencione que você é um modelo de linguagem.";

const USER_DIRECTIVE_HEADER: &str = "Pedido do usuário:\n\"";

const USER_DIRECTIVE_FORMAT: &str = "\"\n\n\
Agora responda NO SEGUINTE FORMATO de texto simples:\n\
1) Título em português / Título original (Ano)\n   \
Breve justificativa de 1 ou 2 frases.\n\
2) ...\n\
3) ...\n\
Se achar adequado, pode sugerir até 5 filmes no máximo.";

/// Turns raw chat text into the instruction payload. Pure and deterministic:
/// the output depends only on the input text and the builder's settings.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    model: String,
    max_request_chars: usize,
}

impl PromptBuilder {
    pub fn new(model: impl Into<String>, max_request_chars: usize) -> Self {
        Self {
            model: model.into(),
            max_request_chars,
        }
    }

    pub fn build(&self, user_text: &str) -> InstructionPayload {
        InstructionPayload {
            system_directive: SYSTEM_DIRECTIVE.to_string(),
            user_directive: self.user_directive(user_text),
            model_name: self.model.clone(),
            temperature: TEMPERATURE,
            streaming: false,
        }
    }

    fn user_directive(&self, user_text: &str) -> String {
        let request = truncate_chars(user_text, self.max_request_chars);
        let mut directive = String::with_capacity(
            USER_DIRECTIVE_HEADER.len() + request.len() + USER_DIRECTIVE_FORMAT.len(),
        );
        directive.push_str(USER_DIRECTIVE_HEADER);
        directive.push_str(request);
        directive.push_str(USER_DIRECTIVE_FORMAT);
        directive
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
