use anyhow::{anyhow, Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Which language model answers the pulse prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Groq,
}

impl FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ModelProvider::Gemini),
            "groq" => Ok(ModelProvider::Groq),
            other => Err(anyhow!("unknown LLM_PROVIDER '{}', expected gemini or groq", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// The single origin allowed to call the API from a browser.
    pub cors_origin: String,

    pub news_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub pulse_provider: ModelProvider,

    /// Applied to every outbound HTTP client.
    pub http_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{} must be set", key));

        let config = Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string()),

            news_api_key: required("NEWS_API_KEY")?,
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            groq_api_key: get("GROQ_API_KEY"),
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| "llama3-70b-8192".to_string()),
            pulse_provider: get("LLM_PROVIDER")
                .unwrap_or_else(|| "gemini".to_string())
                .parse()?,

            http_timeout: Duration::from_secs(
                get("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        };

        if config.pulse_provider == ModelProvider::Groq && config.groq_api_key.is_none() {
            return Err(anyhow!("LLM_PROVIDER=groq requires GROQ_API_KEY"));
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
