//! Ordered error catalogue.
//!
//! Entry order is precedence: a diagnostic that satisfies several categories
//! is assigned to the earliest one. Patterns are lowercase substrings of the
//! KeyAuth server's English wording. Messages are Portuguese, as shown by the
//! desktop shell.

use serde::Serialize;

/// Machine-readable error type reported as `errorType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    /// Username and password were rejected together.
    InvalidCredentials,
    /// No account with that username.
    UserNotFound,
    /// The password does not match the account.
    InvalidPassword,
    /// The account is bound to a different machine.
    HwidMismatch,
    /// No hardware identifier was available.
    HwidNotFound,
    /// The subscription has lapsed.
    SubscriptionExpired,
    /// The account has no active subscription.
    NoSubscription,
    /// The account is banned.
    UserBanned,
    /// The machine is blacklisted.
    HwidBlacklisted,
    /// The application version is no longer accepted.
    InvalidVersion,
    /// The server did not answer in time.
    Timeout,
    /// The server could not be reached.
    ConnectionError,
    /// Wrong number of command-line arguments.
    InvalidArguments,
    /// Application configuration absent or unusable.
    ConfigurationError,
    /// A fault outside every other category.
    CriticalError,
    /// The client failed without writing anything.
    NoDiagnostic,
    /// The client wrote text that matched no category.
    UnknownError,
}

/// One entry of the catalogue.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorCategory {
    /// Stable numeric code.
    pub code: u16,
    /// Machine-readable type.
    pub error_type: ErrorType,
    /// Display message template.
    pub message: &'static str,
    /// Lowercase substrings that select this category.
    pub patterns: &'static [&'static str],
}

/// Categories matched against diagnostic text, in precedence order.
pub static CATALOGUE: &[ErrorCategory] = &[
    ErrorCategory {
        code: 1,
        error_type: ErrorType::InvalidCredentials,
        message: "Usuário ou senha inválidos",
        patterns: &[
            "invalid credentials",
            "invalid details",
            "invalid username or password",
            "invalid login",
        ],
    },
    ErrorCategory {
        code: 2,
        error_type: ErrorType::UserNotFound,
        message: "Usuário não encontrado",
        patterns: &[
            "username not found",
            "user not found",
            "invalid username",
            "user does not exist",
            "user doesn't exist",
        ],
    },
    ErrorCategory {
        code: 3,
        error_type: ErrorType::InvalidPassword,
        message: "Senha incorreta",
        patterns: &[
            "incorrect password",
            "password does not match",
            "password doesn't match",
            "invalid password",
            "wrong password",
        ],
    },
    ErrorCategory {
        code: 4,
        error_type: ErrorType::HwidMismatch,
        message: "HWID não corresponde a este dispositivo. Solicite a redefinição ao administrador",
        patterns: &[
            "hwid doesn't match",
            "hwid does not match",
            "hwid doesnt match",
            "hwid mismatch",
        ],
    },
    ErrorCategory {
        code: 5,
        error_type: ErrorType::HwidNotFound,
        message: "HWID não encontrado. Entre em contato com o administrador",
        patterns: &["hwid not found", "no hwid"],
    },
    ErrorCategory {
        code: 6,
        error_type: ErrorType::SubscriptionExpired,
        message: "Assinatura expirada",
        patterns: &[
            "subscription expired",
            "subscription has expired",
            "license expired",
            "license has expired",
        ],
    },
    ErrorCategory {
        code: 7,
        error_type: ErrorType::NoSubscription,
        message: "Nenhuma assinatura ativa encontrada",
        patterns: &["no active subscription", "no subscription"],
    },
    ErrorCategory {
        code: 8,
        error_type: ErrorType::UserBanned,
        message: "Usuário banido do sistema",
        patterns: &["banned"],
    },
    ErrorCategory {
        code: 9,
        error_type: ErrorType::HwidBlacklisted,
        message: "Hardware bloqueado. Entre em contato com o administrador",
        patterns: &["blacklisted", "blacklist"],
    },
    ErrorCategory {
        code: 10,
        error_type: ErrorType::InvalidVersion,
        message: "Versão da aplicação inválida. Atualize o sistema",
        patterns: &["invalidver", "invalid version", "new version available"],
    },
    ErrorCategory {
        code: 11,
        error_type: ErrorType::Timeout,
        message: "Tempo de conexão esgotado. Tente novamente",
        patterns: &["timed out", "timeout"],
    },
    ErrorCategory {
        code: 12,
        error_type: ErrorType::ConnectionError,
        message: "Erro de conexão com o servidor de autenticação",
        patterns: &["connection", "failed to connect", "network", "dns error"],
    },
];

/// Wrong number of command-line arguments.
pub static INVALID_ARGUMENTS: ErrorCategory = ErrorCategory {
    code: 90,
    error_type: ErrorType::InvalidArguments,
    message: "Argumentos inválidos",
    patterns: &[],
};

/// Application configuration absent or still a placeholder.
pub static CONFIGURATION_ERROR: ErrorCategory = ErrorCategory {
    code: 91,
    error_type: ErrorType::ConfigurationError,
    message: "Configure KEYAUTH_NAME e KEYAUTH_OWNERID no arquivo .env",
    patterns: &[],
};

/// Unexpected fault anywhere in the invocation.
pub static CRITICAL_ERROR: ErrorCategory = ErrorCategory {
    code: 97,
    error_type: ErrorType::CriticalError,
    message: "Erro inesperado durante a autenticação",
    patterns: &[],
};

/// The client failed without writing any diagnostic.
pub static NO_DIAGNOSTIC: ErrorCategory = ErrorCategory {
    code: 98,
    error_type: ErrorType::NoDiagnostic,
    message: "Erro na autenticação sem mensagem do servidor",
    patterns: &[],
};

/// Generic fallback for text that matched no category.
pub static UNKNOWN_ERROR: ErrorCategory = ErrorCategory {
    code: 99,
    error_type: ErrorType::UnknownError,
    message: "Erro na autenticação. Verifique suas credenciais.",
    patterns: &[],
};

/// Reserved entries that are never selected by pattern.
pub static RESERVED: [&ErrorCategory; 5] = [
    &INVALID_ARGUMENTS,
    &CONFIGURATION_ERROR,
    &CRITICAL_ERROR,
    &NO_DIAGNOSTIC,
    &UNKNOWN_ERROR,
];

/// Single-keyword summaries used for [`UNKNOWN_ERROR`] records, first hit wins.
pub static FALLBACK_KEYWORDS: &[(&str, &str)] = &[
    ("username", "Usuário não encontrado"),
    ("user", "Usuário não encontrado"),
    ("password", "Senha incorreta"),
    ("subscription", "Assinatura expirada ou inválida"),
    ("expired", "Assinatura expirada ou inválida"),
    ("banned", "Usuário banido do sistema"),
    ("hwid", "HWID não autorizado. Entre em contato com o administrador"),
    ("blacklist", "Hardware bloqueado. Entre em contato com o administrador"),
    ("invalidver", "Versão da aplicação inválida. Atualize o sistema"),
];
