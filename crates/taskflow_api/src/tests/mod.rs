mod extract_ops;
