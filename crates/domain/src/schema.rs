diesel::table! {
    users (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        admin_approved -> Bool,
        reset_token -> Nullable<Text>,
        reset_token_expires -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    courses (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        duration -> Text,
        price -> Numeric,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    applications (id) {
        id -> Uuid,
        user_id -> Uuid,
        course_id -> Uuid,
        status -> Text,
        applied_at -> Timestamptz,
        payment_status -> Text,
        payment_reference -> Nullable<Text>,
        paid_at -> Nullable<Timestamptz>,
        coupon_id -> Nullable<Uuid>,
        original_price -> Numeric,
        discount_amount -> Numeric,
        final_price -> Numeric,
    }
}

diesel::table! {
    contact_messages (id) {
        id -> Uuid,
        name -> Text,
        email -> Text,
        subject -> Text,
        message -> Text,
        created_at -> Timestamptz,
        is_read -> Bool,
    }
}

diesel::table! {
    coupons (id) {
        id -> Uuid,
        code -> Text,
        description -> Text,
        discount_type -> Text,
        discount_value -> Numeric,
        min_amount -> Numeric,
        max_discount -> Nullable<Numeric>,
        usage_limit -> Nullable<Int4>,
        used_count -> Int4,
        user_limit -> Int4,
        is_active -> Bool,
        valid_from -> Timestamptz,
        valid_until -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        created_by -> Uuid,
    }
}

diesel::table! {
    coupon_usages (id) {
        id -> Uuid,
        coupon_id -> Uuid,
        user_id -> Uuid,
        application_id -> Uuid,
        discount_amount -> Numeric,
        used_at -> Timestamptz,
    }
}

diesel::joinable!(applications -> users (user_id));
diesel::joinable!(applications -> courses (course_id));
diesel::joinable!(applications -> coupons (coupon_id));
diesel::joinable!(coupons -> users (created_by));
diesel::joinable!(coupon_usages -> coupons (coupon_id));
diesel::joinable!(coupon_usages -> users (user_id));
diesel::joinable!(coupon_usages -> applications (application_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    courses,
    applications,
    contact_messages,
    coupons,
    coupon_usages,
);
