// src/handlers/auth.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{LoginRequest, SignupRequest, User, UserProfile, VerifyOtpRequest},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
        otp::generate_otp,
    },
};

const USER_COLUMNS: &str = "id, name, email, password, role, is_verified, bio, \
     years_of_experience, otp_code, otp_expires, created_at";

async fn fetch_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Registers a new account.
///
/// Learners are created verified and receive a token immediately. A trainer
/// signup instead starts the one-time-passcode flow: the account is created
/// unverified and must be confirmed via `verify_otp` before login works.
pub async fn signup(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.role == "trainer" {
        return trainer_signup(&pool, &payload).await;
    }

    if fetch_user_by_email(&pool, &payload.email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password, role, is_verified) \
         VALUES ($1, $2, $3, 'learner', TRUE) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("User already exists".to_string())
        } else {
            tracing::error!("Failed to register learner: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Learner account created successfully",
            "token": token,
            "user": UserProfile::from(&user),
        })),
    )
        .into_response())
}

/// Trainer registration: stores the account unverified with a fresh
/// passcode. Re-registering an unverified trainer refreshes the password
/// and the passcode; a verified trainer cannot be re-registered.
async fn trainer_signup(pool: &PgPool, payload: &SignupRequest) -> Result<Response, AppError> {
    let hashed_password = hash_password(&payload.password)?;
    let (otp_code, otp_expires) = generate_otp();

    let existing = fetch_user_by_email(pool, &payload.email).await?;

    let trainer_id = match existing {
        Some(user) if user.role == "trainer" && user.is_verified => {
            return Err(AppError::BadRequest(
                "Trainer account already exists and is verified. Please log in.".to_string(),
            ));
        }
        Some(user) if user.role == "trainer" => {
            sqlx::query(
                "UPDATE users SET password = $1, otp_code = $2, otp_expires = $3, \
                 is_verified = FALSE WHERE id = $4",
            )
            .bind(&hashed_password)
            .bind(&otp_code)
            .bind(otp_expires)
            .bind(user.id)
            .execute(pool)
            .await?;
            user.id
        }
        Some(_) => {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        None => {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO users (name, email, password, role, is_verified, otp_code, otp_expires) \
                 VALUES ($1, $2, $3, 'trainer', FALSE, $4, $5) \
                 RETURNING id",
            )
            .bind(&payload.name)
            .bind(&payload.email)
            .bind(&hashed_password)
            .bind(&otp_code)
            .bind(otp_expires)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("User already exists".to_string())
                } else {
                    tracing::error!("Failed to register trainer: {:?}", e);
                    AppError::from(e)
                }
            })?;
            id
        }
    };

    // Notification channel is out of scope; the passcode goes to the log,
    // matching the mock email of the reference deployment.
    tracing::info!(
        "Mock email to {}: your verification code is {} (expires {})",
        payload.email,
        otp_code,
        otp_expires
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Trainer registration initiated. A verification code was sent to your email.",
            "trainer": { "id": trainer_id, "email": payload.email, "isVerified": false },
        })),
    )
        .into_response())
}

/// Confirms a trainer's one-time passcode.
///
/// Expiry is checked lazily here; nothing sweeps stale codes. On success the
/// account is marked verified, the passcode columns are cleared, and a token
/// is issued.
pub async fn verify_otp(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = fetch_user_by_email(&pool, &payload.email)
        .await?
        .filter(|u| u.role == "trainer")
        .ok_or(AppError::NotFound("Trainer account not found".to_string()))?;

    if user.is_verified {
        return Err(AppError::BadRequest(
            "Account is already verified. Please log in.".to_string(),
        ));
    }

    if user.otp_code.as_deref() != Some(payload.otp.as_str()) {
        return Err(AppError::AuthError("Invalid verification code".to_string()));
    }

    let expired = match user.otp_expires {
        Some(expires) => expires < chrono::Utc::now(),
        None => true,
    };
    if expired {
        return Err(AppError::AuthError(
            "Verification code has expired. Please register again.".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET is_verified = TRUE, otp_code = NULL, otp_expires = NULL \
         WHERE id = $1 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .fetch_one(&pool)
    .await?;

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "message": "Verification successful",
        "token": token,
        "user": UserProfile::from(&user),
    })))
}

/// Authenticates a user and returns a JWT token.
///
/// Unverified trainers are blocked here, at credential issuance: this is the
/// sole verification checkpoint, so a token issued earlier stays valid until
/// it expires even if the account is un-verified afterwards.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = fetch_user_by_email(&pool, &payload.email)
        .await?
        .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    if user.role == "trainer" && !user.is_verified {
        return Err(AppError::Forbidden(
            "Account not verified. Please check your email for the verification code.".to_string(),
        ));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserProfile::from(&user),
    })))
}
