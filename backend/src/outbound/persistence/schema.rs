//! Diesel table definitions matching `migrations/`.
//!
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    members (id) {
        id -> Uuid,
        display_name -> Varchar,
        role -> Varchar,
        is_active -> Bool,
        help_count -> Int4,
        warning_count -> Int4,
        is_blocked -> Bool,
        blocked_at -> Nullable<Timestamptz>,
        block_reason -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    help_requests (id) {
        id -> Uuid,
        requested_by -> Uuid,
        title -> Varchar,
        description -> Varchar,
        category -> Varchar,
        urgency -> Varchar,
        contact_preference -> Varchar,
        location_hint -> Nullable<Varchar>,
        image_url -> Nullable<Text>,
        /// Stored lifecycle state; never `expired`.
        status -> Varchar,
        accepted_helper -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        expires_at -> Timestamptz,
        fulfilled_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    help_responses (id) {
        id -> Uuid,
        request_id -> Uuid,
        responder -> Uuid,
        message -> Varchar,
        image_url -> Nullable<Text>,
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    chats (id) {
        id -> Uuid,
        request_id -> Uuid,
        participant_low -> Uuid,
        participant_high -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    chat_messages (id) {
        id -> Uuid,
        chat_id -> Uuid,
        sender -> Uuid,
        content -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reports (id) {
        id -> Uuid,
        reported_id -> Uuid,
        reporter_id -> Uuid,
        reason -> Varchar,
        description -> Varchar,
        severity -> Varchar,
        status -> Varchar,
        is_validated -> Bool,
        reviewed_by -> Nullable<Uuid>,
        reviewed_at -> Nullable<Timestamptz>,
        review_notes -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    member_warnings (id) {
        id -> Int8,
        member_id -> Uuid,
        report_id -> Uuid,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient -> Uuid,
        notification_type -> Varchar,
        /// Tagged `{type, data}` event payload.
        payload -> Jsonb,
        title -> Varchar,
        message -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(help_responses -> help_requests (request_id));
diesel::joinable!(chats -> help_requests (request_id));
diesel::joinable!(chat_messages -> chats (chat_id));
diesel::joinable!(member_warnings -> reports (report_id));

diesel::allow_tables_to_appear_in_same_query!(
    members,
    help_requests,
    help_responses,
    chats,
    chat_messages,
    reports,
    member_warnings,
    notifications,
);
