use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Ligne invalide : {expected} valeurs attendues, {actual} reçues")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Valeur non numérique à l'index {index} : '{value}'")]
    NonNumeric { index: usize, value: String },

    #[error("{field} = {value} hors limites ({min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Le tirage {round_id} existe déjà")]
    DuplicateRound { round_id: u32 },

    #[error("Erreur d'accès au fichier {path} : {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fichier de données corrompu ({path}) : {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
