diesel::table! {
    payments (id) {
        id -> Int4,
        #[sql_name = "payment_id"]
        #[max_length = 4096]
        payment_token -> Varchar,
        payment_completion_date -> Nullable<Timestamptz>,
        #[max_length = 50]
        payment_status_code -> Varchar,
        #[max_length = 100]
        payment_note -> Nullable<Varchar>,
        #[max_length = 50]
        payment_action -> Varchar,
        furnished -> Bool,
        nr_id -> Int4,
    }
}

diesel::table! {
    requests (id) {
        id -> Int4,
        nr_num -> Varchar,
        state_cd -> Varchar,
    }
}

diesel::joinable!(payments -> requests (nr_id));

diesel::allow_tables_to_appear_in_same_query!(
    payments,
    requests,
);
