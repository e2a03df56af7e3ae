pub mod max_principal;
