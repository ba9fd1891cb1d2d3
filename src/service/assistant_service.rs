use std::sync::Arc;

use serenity::async_trait;
use tracing::{error, info, warn};

use crate::clients::gemini_client;
use crate::error::{BotError, Result};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const RATE_LIMITED_REPLY: &str = "Limite de requisições excedido, tente novamente mais tarde";
pub const FAILURE_REPLY: &str = "Desculpe, ocorreu um erro ao processar sua mensagem";

const PERSONA_PROMPT: &str = "Você é o Vision, um assistente de IA executiva, especializado em gerenciamento de tempo e organização de projetos. \
Sua missão é ajudar os CEOs a serem mais produtivos, organizados e eficientes, oferecendo conselhos práticos, estratégias e sugestões \
baseadas em boas práticas de gestão. Responda de forma clara, amigável e concisa, sempre adaptando suas respostas ao contexto fornecido pelo usuário.

### Instruções:
1. **Leia e analise o texto enviado:** Use as informações fornecidas pelo usuário para dar conselhos personalizados sobre gerenciamento de tempo ou organização de projetos.
2. **Diferencie comandos:** Se a mensagem começar com '/', reconheça que é um comando do bot e responda com algo como: \"Isso parece um comando! Use os comandos específicos do bot para ações como /schedule ou /tasklist. Como posso ajudar com seu tempo ou projetos?\" Não tente executar o comando.
3. **Responda mensagens sem comandos:** Para mensagens que não começam com '/', forneça conselhos úteis de gerenciamento de tempo ou organização de projetos com base no conteúdo da mensagem. Se o contexto for vago, peça mais detalhes ou ofereça dicas gerais.
4. **Seja proativo:** Sugira técnicas como a Matriz Eisenhower, Pomodoro, ou priorização de tarefas quando relevante.
5. **Admita limitações:** Se não souber algo, diga: \"Não tenho certeza sobre isso, mas sugiro pesquisar mais ou experimentar [sugestão]. Como posso ajudar mais?\"";

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

pub struct GeminiService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiService {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl GenerativeClient for GeminiService {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        gemini_client::generate_content(&self.http, &self.base_url, &self.api_key, prompt, temperature)
            .await
    }
}

pub fn build_prompt(message: &str) -> String {
    format!("{}\n\nPergunta do usuário: {}", PERSONA_PROMPT, message)
}

/// Free-form advice. Never fails: collaborator errors become a fixed reply.
pub struct AssistantService {
    client: Arc<dyn GenerativeClient>,
}

impl AssistantService {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    pub async fn advise(&self, message: &str, temperature: f32) -> String {
        info!(chars = message.len(), "asking the assistant");
        match self.client.generate(&build_prompt(message), temperature).await {
            Ok(reply) => reply,
            Err(BotError::RateLimited) => {
                warn!("generative API rate limit reached");
                RATE_LIMITED_REPLY.to_string()
            }
            Err(err) => {
                error!(error = %err, "generative API call failed");
                FAILURE_REPLY.to_string()
            }
        }
    }
}
