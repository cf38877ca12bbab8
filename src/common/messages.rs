// src/common/messages.rs

// Catálogo mínimo de mensagens da API. Chave = `AppError::code()`.
// Idioma desconhecido cai no inglês.
pub fn lookup(lang: &str, code: &str) -> &'static str {
    match lang {
        "pt" => pt(code),
        _ => en(code),
    }
}

fn en(code: &str) -> &'static str {
    match code {
        "validation_error" => "One or more fields are invalid.",
        "invalid_credentials" => "Invalid email or password.",
        "invalid_or_expired_token" => "Authentication token is invalid, expired or missing.",
        "permission_denied" => "You are not allowed to access this resource.",
        "invalid_transition" => "This status change is not allowed.",
        "out_of_bounds" => "Incident coordinates must be between 0 and 1.",
        "missing_floor_plan" => "The floor plan does not exist.",
        "floor_plan_mismatch" => "The case is already bound to another floor plan.",
        "franchise_mismatch" => "The target belongs to a different franchise.",
        "case_not_found" => "Case not found.",
        "user_not_found" => "User not found.",
        "resource_not_found" => "Resource not found.",
        "conflict" => "The resource was changed concurrently, try again.",
        _ => "An unexpected error occurred.",
    }
}

fn pt(code: &str) -> &'static str {
    match code {
        "validation_error" => "Um ou mais campos são inválidos.",
        "invalid_credentials" => "E-mail ou senha inválidos.",
        "invalid_or_expired_token" => "Token de autenticação inválido, expirado ou ausente.",
        "permission_denied" => "Você não tem permissão para acessar este recurso.",
        "invalid_transition" => "Esta mudança de status não é permitida.",
        "out_of_bounds" => "As coordenadas do incidente devem estar entre 0 e 1.",
        "missing_floor_plan" => "A planta baixa não existe.",
        "floor_plan_mismatch" => "O caso já está vinculado a outra planta baixa.",
        "franchise_mismatch" => "O destino pertence a outra franquia.",
        "case_not_found" => "Caso não encontrado.",
        "user_not_found" => "Usuário não encontrado.",
        "resource_not_found" => "Recurso não encontrado.",
        "conflict" => "O recurso foi alterado por outra requisição, tente novamente.",
        _ => "Ocorreu um erro inesperado.",
    }
}
