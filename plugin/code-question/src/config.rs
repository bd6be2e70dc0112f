use serde::Deserialize;
use std::env;

use crate::plugin::DEFAULT_QUESTION_TAG;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_database: String,
    pub questions_collection: String,
    pub submissions_collection: String,
    /// Tag identifying the questions this plugin instance owns.
    pub question_tag: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "asq".to_string());

        let questions_collection = settings
            .get_string("database.questions_collection")
            .or_else(|_| env::var("QUESTIONS_COLLECTION"))
            .unwrap_or_else(|_| "questions".to_string());

        let submissions_collection = settings
            .get_string("database.submissions_collection")
            .or_else(|_| env::var("SUBMISSIONS_COLLECTION"))
            .unwrap_or_else(|_| "answers".to_string());

        let question_tag = settings
            .get_string("plugin.question_tag")
            .or_else(|_| env::var("QUESTION_TAG"))
            .unwrap_or_else(|_| DEFAULT_QUESTION_TAG.to_string());

        Ok(Config {
            mongo_uri,
            mongo_database,
            questions_collection,
            submissions_collection,
            question_tag,
        })
    }
}
