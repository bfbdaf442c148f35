mod client_ops;
