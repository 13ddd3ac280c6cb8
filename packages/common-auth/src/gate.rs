//! Proteção de navegação das áreas `/admin` e `/patient`
//!
//! Sem sessão válida (ou com papel incompatível com a área) o visitante é
//! enviado para a tela de login, levando o caminho original como retorno.

use common_db::models::Role;

use crate::token::Claims;

/// Cookie onde o front-end espelha o token de sessão
pub const SESSION_COOKIE: &str = "token";

pub const LOGIN_PATH: &str = "/login";

/// Prefixos protegidos e o papel exigido por cada um
pub const PROTECTED_SECTIONS: [(&str, Role); 2] = [("/admin", Role::Admin), ("/patient", Role::Patient)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Redirecionar para o login; `callback` é o caminho pedido
    RedirectToLogin { callback: String },
}

/// Papel exigido para o caminho, se ele estiver numa área protegida
pub fn required_role(path: &str) -> Option<Role> {
    PROTECTED_SECTIONS
        .iter()
        .find(|(prefix, _)| {
            path == *prefix
                || path
                    .strip_prefix(prefix)
                    .map_or(false, |rest| rest.starts_with('/'))
        })
        .map(|(_, role)| *role)
}

/// Decide se a navegação segue ou volta para o login
pub fn evaluate(path: &str, session: Option<&Claims>) -> GateDecision {
    let Some(required) = required_role(path) else {
        return GateDecision::Allow;
    };
    match session {
        Some(claims) if claims.role == required => GateDecision::Allow,
        _ => GateDecision::RedirectToLogin {
            callback: path.to_string(),
        },
    }
}

/// Extrai o token de sessão de um cabeçalho `Cookie`
pub fn session_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
