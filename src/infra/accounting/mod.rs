pub mod http_accounting_provider;
