//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    cheque::ChequeStatus,
    internal_server_error::{ForbiddenError, InternalServerError},
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token cookie could not be parsed.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The logged in user's role does not allow the requested action.
    #[error("the user is not allowed to perform this action")]
    Forbidden,

    /// An empty string was used as a username.
    #[error("Le nom d'utilisateur est obligatoire")]
    EmptyUsername,

    /// The username is already taken.
    #[error("the username \"{0}\" already exists in the database")]
    DuplicateUsername(String),

    /// A string that does not name a role.
    #[error("unknown role \"{0}\"")]
    InvalidRole(String),

    /// An empty string was used to create a bank name.
    #[error("Le nom de la banque est obligatoire")]
    EmptyBankName,

    /// The bank name is already taken.
    #[error("the bank \"{0}\" already exists in the database")]
    DuplicateBankName(String),

    /// Tried to update a bank that does not exist
    #[error("tried to update a bank that is not in the database")]
    UpdateMissingBank,

    /// Tried to delete a bank that does not exist
    #[error("tried to delete a bank that is not in the database")]
    DeleteMissingBank,

    /// Tried to delete a bank whose branches are referenced by cheques.
    #[error("the bank has branches that are referenced by cheques")]
    BankHasCheques,

    /// The bank ID used to create a branch did not match a valid bank.
    #[error("the bank ID does not refer to a valid bank")]
    InvalidBank,

    /// An empty string was used to create a branch name.
    #[error("Le nom de l'agence est obligatoire")]
    EmptyBranchName,

    /// Tried to update a branch that does not exist
    #[error("tried to update a branch that is not in the database")]
    UpdateMissingBranch,

    /// Tried to delete a branch that does not exist
    #[error("tried to delete a branch that is not in the database")]
    DeleteMissingBranch,

    /// Tried to delete a branch that is referenced by cheques.
    #[error("the branch is referenced by cheques")]
    BranchHasCheques,

    /// The branch ID used for a cheque did not match a valid branch.
    #[error("the branch ID does not refer to a valid branch")]
    InvalidBranch,

    /// An empty string was used to create a client name.
    #[error("Le nom du client est obligatoire")]
    EmptyClientName,

    /// A string that does not name a client kind.
    #[error("unknown client kind \"{0}\"")]
    InvalidClientKind(String),

    /// Tried to update a client that does not exist
    #[error("tried to update a client that is not in the database")]
    UpdateMissingClient,

    /// Tried to delete a client that does not exist
    #[error("tried to delete a client that is not in the database")]
    DeleteMissingClient,

    /// Tried to delete a client that still has cheques.
    #[error("the client has cheques")]
    ClientHasCheques,

    /// The client ID used for a cheque did not match a valid client.
    #[error("the client ID does not refer to a valid client")]
    InvalidClient,

    /// An empty string was used as a cheque number.
    #[error("Le numéro du chèque est obligatoire")]
    EmptyChequeNumber,

    /// The cheque amount is below the minimum of 0.01.
    #[error("Le montant doit être supérieur ou égal à 0,01")]
    InvalidAmount,

    /// A string that does not name a supported currency.
    #[error("unknown currency \"{0}\"")]
    InvalidCurrency(String),

    /// The due date is before the issue date.
    #[error("La date d'échéance doit être postérieure à la date d'émission")]
    DueDateBeforeIssueDate,

    /// A date form field that is not formatted as YYYY-MM-DD.
    #[error("Date invalide : {0}")]
    InvalidDate(String),

    /// Another cheque from the same branch already uses this number.
    #[error("Un chèque avec ce numéro existe déjà pour cette agence")]
    DuplicateChequeNumber,

    /// A string that does not name a cheque status.
    #[error("unknown cheque status \"{0}\"")]
    InvalidChequeStatus(String),

    /// The requested status is not a valid successor of the current status.
    #[error("cannot change the status of a cheque from {from} to {to}")]
    InvalidStatusTransition {
        /// The status stored in the database.
        from: ChequeStatus,
        /// The requested status.
        to: ChequeStatus,
    },

    /// The stored status changed between reading and updating the cheque.
    #[error("the cheque status was changed by another request")]
    StatusChanged,

    /// Tried to update a cheque that does not exist
    #[error("tried to update a cheque that is not in the database")]
    UpdateMissingCheque,

    /// Tried to delete a cheque that does not exist
    #[error("tried to delete a cheque that is not in the database")]
    DeleteMissingCheque,

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The uploaded scan is not a JPEG, PNG or PDF file.
    #[error("unsupported scan file type")]
    UnsupportedScanType,

    /// The uploaded scan exceeds the size limit.
    #[error("the scan file is too large")]
    ScanTooLarge,

    /// The multipart form did not contain a file.
    #[error("no scan file was uploaded")]
    ScanMissing,

    /// A file could not be read or written.
    #[error("file error: {0}")]
    FileError(String),

    /// A workbook exists but could not be read.
    #[error("could not read workbook: {0}")]
    WorkbookRead(String),

    /// A workbook could not be written, e.g. because it is open in another program.
    #[error("could not write workbook: {0}")]
    WorkbookWrite(String),

    /// A string that does not name a notification kind.
    #[error("unknown notification kind \"{0}\"")]
    InvalidNotificationKind(String),

    /// Tried to mark a notification that does not exist as read.
    #[error("tried to update a notification that is not in the database")]
    UpdateMissingNotification,

    /// The database backup could not be created.
    #[error("could not back up the database: {0}")]
    BackupError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("cheque.number") =>
            {
                Error::DuplicateChequeNumber
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("bank.name") =>
            {
                Error::DuplicateBankName(String::new())
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername(String::new())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::Forbidden => ForbiddenError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Fuseau horaire invalide",
                fix: &format!(
                    "Le fuseau horaire \"{timezone}\" est inconnu. Vérifiez la configuration du \
                    serveur et utilisez un nom de fuseau canonique, par exemple \"Africa/Casablanca\"."
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::Error {
                    message: "Accès refusé".to_owned(),
                    details: "Votre rôle ne permet pas d'effectuer cette action.".to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Fuseau horaire invalide".to_owned(),
                    details: format!(
                        "Le fuseau horaire \"{timezone}\" est inconnu. Vérifiez la configuration du serveur."
                    ),
                },
            ),
            Error::DuplicateBankName(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Banque existante".to_owned(),
                    details: if name.is_empty() {
                        "Une banque porte déjà ce nom.".to_owned()
                    } else {
                        format!("La banque \"{name}\" existe déjà.")
                    },
                },
            ),
            Error::UpdateMissingBank => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de modifier la banque".to_owned(),
                    details: "La banque est introuvable.".to_owned(),
                },
            ),
            Error::DeleteMissingBank => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de supprimer la banque".to_owned(),
                    details: "La banque est introuvable. Actualisez la page pour vérifier \
                        qu'elle n'a pas déjà été supprimée."
                        .to_owned(),
                },
            ),
            Error::BankHasCheques => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Impossible de supprimer la banque".to_owned(),
                    details: "Des chèques sont rattachés à ses agences.".to_owned(),
                },
            ),
            Error::InvalidBank => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "La banque sélectionnée est introuvable.".to_owned(),
                },
            ),
            Error::UpdateMissingBranch => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de modifier l'agence".to_owned(),
                    details: "L'agence est introuvable.".to_owned(),
                },
            ),
            Error::DeleteMissingBranch => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de supprimer l'agence".to_owned(),
                    details: "L'agence est introuvable. Actualisez la page pour vérifier \
                        qu'elle n'a pas déjà été supprimée."
                        .to_owned(),
                },
            ),
            Error::BranchHasCheques => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Impossible de supprimer l'agence".to_owned(),
                    details: "Des chèques sont rattachés à cette agence.".to_owned(),
                },
            ),
            Error::InvalidBranch => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "L'agence sélectionnée est introuvable.".to_owned(),
                },
            ),
            Error::UpdateMissingClient => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de modifier le client".to_owned(),
                    details: "Le client est introuvable.".to_owned(),
                },
            ),
            Error::DeleteMissingClient => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de supprimer le client".to_owned(),
                    details: "Le client est introuvable. Actualisez la page pour vérifier \
                        qu'il n'a pas déjà été supprimé."
                        .to_owned(),
                },
            ),
            Error::ClientHasCheques => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Impossible de supprimer le client".to_owned(),
                    details: "Ce client possède des chèques.".to_owned(),
                },
            ),
            Error::InvalidClient => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Le client sélectionné est introuvable.".to_owned(),
                },
            ),
            Error::DuplicateChequeNumber => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Chèque en double".to_owned(),
                    details: "Un chèque avec ce numéro existe déjà pour cette agence.".to_owned(),
                },
            ),
            Error::InvalidStatusTransition { from, to } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Changement de statut refusé".to_owned(),
                    details: format!(
                        "Un chèque « {} » ne peut pas passer à « {} ».",
                        from.label(),
                        to.label()
                    ),
                },
            ),
            Error::StatusChanged => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Changement de statut refusé".to_owned(),
                    details: "Le statut du chèque a été modifié entre-temps. Actualisez la page."
                        .to_owned(),
                },
            ),
            Error::InvalidChequeStatus(status) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: format!("Statut inconnu : {status}"),
                },
            ),
            error @ Error::InvalidDate(_) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: error.to_string(),
                },
            ),
            Error::UpdateMissingCheque => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de modifier le chèque".to_owned(),
                    details: "Le chèque est introuvable.".to_owned(),
                },
            ),
            Error::DeleteMissingCheque => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Impossible de supprimer le chèque".to_owned(),
                    details: "Le chèque est introuvable. Actualisez la page pour vérifier \
                        qu'il n'a pas déjà été supprimé."
                        .to_owned(),
                },
            ),
            Error::UnsupportedScanType => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Format de fichier non pris en charge".to_owned(),
                    details: "Formats acceptés : JPG, JPEG, PNG et PDF.".to_owned(),
                },
            ),
            Error::ScanTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::Error {
                    message: "Fichier trop volumineux".to_owned(),
                    details: "La taille maximale d'un scan est de 16 Mo.".to_owned(),
                },
            ),
            Error::ScanMissing => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Aucun fichier sélectionné.".to_owned(),
                },
            ),
            Error::MultipartError(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Envoi du fichier impossible".to_owned(),
                    details,
                },
            ),
            Error::WorkbookRead(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Lecture du classeur Excel impossible".to_owned(),
                    details,
                },
            ),
            Error::WorkbookWrite(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Écriture du classeur Excel impossible".to_owned(),
                    details: format!(
                        "Le fichier est peut-être ouvert dans un autre programme. {details}"
                    ),
                },
            ),
            Error::UpdateMissingNotification => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "La notification est introuvable.".to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::ErrorSimple {
                    message: "Élément introuvable.".to_owned(),
                },
            ),
            Error::DatabaseLockError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Erreur interne".to_owned(),
                    details: "La base de données est indisponible. Réessayez plus tard.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Une erreur inattendue est survenue".to_owned(),
                        details: "Consultez les journaux du serveur pour plus de détails."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
