pub mod acessos;
pub mod auth;
pub mod notificacoes;
pub mod usuarios;
