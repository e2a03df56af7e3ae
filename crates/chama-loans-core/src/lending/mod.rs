pub mod amortization;
pub mod products;
pub mod quote;
