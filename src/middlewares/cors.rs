use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // 在生产环境中应该限制允许的域名
            true
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        // 调用方（展示层/运营工具）可能带自定义 Header，放宽避免预检失败
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
